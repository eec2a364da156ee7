use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// RUSHB server: binds a UDP socket, prints the bound port, and serves
/// GET requests for files in its working directory (or `--bind`/a chosen
/// source directory) until killed.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    /// Local address to bind. Defaults to an OS-chosen port on all
    /// interfaces; the chosen port is always printed to stdout
    /// regardless of this flag.
    #[arg(long, default_value = "0.0.0.0:0")]
    bind: String,

    /// Directory GET requests are served from.
    #[arg(long, default_value = ".")]
    source_dir: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = rushb::listener::run(&args.bind, args.source_dir) {
        log::error!("server failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
