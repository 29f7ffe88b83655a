#[tokio::main]
async fn main() -> anyhow::Result<()> {
    archetype_server::run().await
}
