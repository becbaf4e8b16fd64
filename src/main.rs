use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    talu_chat::cli::run_cli().await
}
