use color_namer_web::{ServerConfig, start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Bind address and table path from env or defaults
    let cfg = ServerConfig::from_env();

    let (_addr, handle) = start_server(cfg).await?;
    // Park forever
    handle.await.ok();
    Ok(())
}
