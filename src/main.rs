use src2pdf::{cli::parse_args, run_src2pdf};

fn init_logger(verbosity: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else {
        match verbosity {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    let result = match parse_args() {
        Ok(config) => {
            init_logger(config.verbosity, config.quiet);
            run_src2pdf(config).await.map(|_| ())
        }
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
