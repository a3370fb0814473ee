use colored::Colorize;
use std::path::Path;
use waitflow_cloud::StateManager;

pub async fn handle(address: &str, import_id: &str, dir: &Path) -> anyhow::Result<()> {
    let manager = StateManager::new(dir);
    let mut state = manager.load().await?;

    let engine = super::engine_from_env()?;
    engine.import(address, import_id, &mut state).await?;
    manager.save(&state).await?;

    println!("{} Imported {}", "✓".green(), address.cyan());
    Ok(())
}
