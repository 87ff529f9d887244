use anyhow::Context;
use clap::Parser;
use narrator::{Config, init_logging, run};
use tracing::warn;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let config = Config::parse();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    let stdout = tokio::io::stdout();
    match config.input.clone() {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            run(config, file, stdout, shutdown).await?;
        }
        None => {
            run(config, tokio::io::stdin(), stdout, shutdown).await?;
        }
    }
    Ok(())
}
