use std::path::PathBuf;
use clap::Parser;
use log::info;
use gcmq::{ Config, LogSink };

mod logging;

/// Compute the lowest stationary states of the geometric collective model
/// described by a TOML configuration and save them for post-processing.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Run configuration. Missing keys take their default values.
    config: PathBuf,

    #[arg(short, long, default_value = "state.toml")]
    /// Where to save the computed eigenpairs.
    output: PathBuf,

    #[arg(long)]
    /// Write a configuration file with all defaults to CONFIG and exit.
    template: bool,

    #[arg(long)]
    /// Only log the trace of the Hamiltonian matrix.
    trace: bool,

    #[arg(long)]
    /// Directory for a `run.log` copy of the log.
    log_dir: Option<PathBuf>,

    #[arg(short, long)]
    /// Log debug messages as well.
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::logger_init(cli.log_dir.as_deref(), cli.verbose)?;

    if cli.template {
        std::fs::write(&cli.config, Config::default().to_toml_string()?)?;
        info!("wrote default configuration to {}", cli.config.display());
        return Ok(());
    }

    let cfg = Config::from_file(&cli.config)?;
    let solver = cfg.solver()?;
    let mut sink = LogSink::default();

    if cli.trace {
        let tr = solver.trace(cfg.max_e, &mut sink)?;
        info!("trace = {:.10e}", tr);
        return Ok(());
    }

    let res = solver.compute(cfg.max_e, cfg.count, cfg.vectors, cfg.method, &mut sink)?;
    let hw = solver.hamiltonian().quantum();
    if res.vectors.is_some() {
        info!("{:>4}  {:>16}  {:>12}  {:>6}  {:>8}  {:>8}",
            "k", "E", "(E - E0)/hw", "parity", "<|l|>", "<N>");
    } else {
        info!("{:>4}  {:>16}  {:>12}", "k", "E", "(E - E0)/hw");
    }
    let e0 = res.values.get(0).copied().unwrap_or(0.0);
    for (k, e) in res.values.iter().enumerate() {
        if res.vectors.is_some() {
            info!("{:>4}  {:>16.10}  {:>12.6}  {:>6}  {:>8.4}  {:>8.4}",
                k, e, (e - e0) / hw,
                solver.parity(k)?,
                solver.mean_angular(k)?,
                solver.mean_quanta(k)?,
            );
        } else {
            info!("{:>4}  {:>16.10}  {:>12.6}", k, e, (e - e0) / hw);
        }
    }

    solver.save_state()?.write(&cli.output)?;
    info!("saved {} eigenpairs to {}", res.len(), cli.output.display());
    Ok(())
}
