use clap::Parser;
use tracing_subscriber::EnvFilter;

use concur_cores::shell::error::Error;
use concur_cores::shell::repl;

/// A pipeline-and-subshell command interpreter.
#[derive(Debug, Parser)]
#[command(name = "eshell")]
struct Cli {
    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match repl::run() {
        Ok(()) => std::process::exit(0),
        Err(Error::Io(e)) => {
            eprintln!("eshell: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            // Spawn/parse errors are caught and reported inside the REPL
            // loop itself; reaching this arm would mean one leaked.
            eprintln!("eshell: {e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
