//! gcm-dump CLI entry point.

use gcm_dump::cli::{self, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(category = e.category(), "{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
