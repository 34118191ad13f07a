pub fn run() -> anyhow::Result<()> {
    println!("botmetrics {}", env!("CARGO_PKG_VERSION"));
    println!("Chat-bot log normalization and metrics aggregation");
    Ok(())
}
