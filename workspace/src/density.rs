use std::{
    fs::File,
    io::{ BufWriter, Write },
    path::PathBuf,
};
use clap::Parser;
use log::{ info, warn };
use gcmq::{
    grid::Grid,
    utils::trapz2,
    SavedState,
    Solver,
    Strategy,
};

mod logging;

/// Tabulate the probability density of a saved eigenstate on the
/// (β cos γ, β sin γ) plane.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// State file written by `gcm`.
    state: PathBuf,

    #[arg(short, long, default_value_t = 0)]
    /// Index of the eigenstate, counting from the ground state.
    k: usize,

    #[arg(short, long, default_value_t = 1.0)]
    /// Half-width of the square grid, in units of β.
    extent: f64,

    #[arg(short, long, default_value_t = 201)]
    /// Number of grid points along each axis.
    points: usize,

    #[arg(short, long, default_value = "density.dat")]
    /// Output file with whitespace-separated `x y rho V` columns, where `V` is
    /// the classical potential at that point.
    output: PathBuf,

    #[arg(short, long)]
    /// Log debug messages as well.
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::logger_init(None, cli.verbose)?;

    let state = SavedState::read(&cli.state)?;
    let solver = Solver::restore(&state, Strategy::default())?;
    let grid = Grid::closed(-cli.extent, cli.extent, cli.points)?;
    let x = grid.points();
    let rho = solver.density_matrix(cli.k, &x, &x)?;

    let norm = trapz2(&rho, grid.step(), grid.step());
    info!("state {}: integrated density {:.8}", cli.k, norm);
    if (norm - 1.0).abs() > 1e-2 {
        warn!("density is not normalized on this grid; try a larger extent");
    }

    let ham = solver.hamiltonian();
    let mut out = BufWriter::new(File::create(&cli.output)?);
    for (i, xi) in x.iter().enumerate() {
        for (j, yj) in x.iter().enumerate() {
            let v = ham.potential(xi.hypot(*yj), yj.atan2(*xi));
            writeln!(out, "{:.8e} {:.8e} {:.8e} {:.8e}", xi, yj, rho[[i, j]], v)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    info!("wrote {}", cli.output.display());
    Ok(())
}
