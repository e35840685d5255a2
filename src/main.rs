//! searchio command-line entry point.

use console::style;

fn main() {
    // Logs go to stderr; stdout carries feedback for the launcher
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "searchio=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = searchio::cli::run() {
        if e
            .downcast_ref::<searchio::SearchioError>()
            .is_some_and(|e| e.is_not_found())
        {
            eprintln!("{} {}", style("!").yellow().bold(), e);
            return;
        }

        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
