//! Qdrant probe - Entry Point

#[tokio::main]
async fn main() -> eyre::Result<()> {
    core_config::tracing::install_color_eyre();
    qentity_probe::run().await
}
