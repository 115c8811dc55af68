//! BlogForge 入口

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    blogforge_lib::run().await
}
