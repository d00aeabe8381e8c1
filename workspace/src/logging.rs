use std::path::Path;
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ ConsoleAppender, Target },
        file::FileAppender,
    },
    config::{ Appender, Config, Root },
    encode::pattern::PatternEncoder,
    Handle,
};

const ENCODE_STR: &str = "{d(%Y-%m-%d %H:%M:%S)} [{h({l:>5})}] {m}{n}";

fn logger_config(dir: Option<&Path>, level: LevelFilter) -> anyhow::Result<Config> {
    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(ENCODE_STR)))
        .target(Target::Stderr)
        .build();
    let builder = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)));
    let root = Root::builder().appender("stderr");

    let (builder, root)
        = match dir {
            Some(dir) => {
                let logfile = FileAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(ENCODE_STR)))
                    .build(dir.join("run.log"))?;
                (
                    builder.appender(
                        Appender::builder().build("logfile", Box::new(logfile))),
                    root.appender("logfile"),
                )
            },
            None => (builder, root),
        };
    Ok(builder.build(root.build(level))?)
}

/// Log to stderr and, if `dir` is given, to `dir/run.log`.
pub fn logger_init(dir: Option<&Path>, verbose: bool) -> anyhow::Result<Handle> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    Ok(log4rs::init_config(logger_config(dir, level)?)?)
}
