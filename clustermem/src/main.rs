use clap::Parser;

use clustermem::{init_logging, run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Error: {}", e.chain_message());
        std::process::exit(e.exit_code());
    }

    match run(&cli).await {
        Ok(report) => print!("{}", report),
        Err(e) => {
            tracing::debug!("Run failed: {:?}", e);
            eprintln!("Error: {}", e.chain_message());
            std::process::exit(e.exit_code());
        }
    }
}
