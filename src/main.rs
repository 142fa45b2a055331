use clap::Parser;
use cropwx_pipeline::cli::{run, Cli};
use cropwx_pipeline::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
