use colored::Colorize;
use std::path::Path;
use waitflow_cloud::StateManager;

pub async fn handle(dir: &Path) -> anyhow::Result<()> {
    let manager = StateManager::new(dir);
    let mut state = manager.load().await?;
    if state.is_empty() {
        println!("{}", "Nothing to destroy.".green());
        return Ok(());
    }

    let engine = super::engine_from_env()?;
    println!(
        "{}",
        format!("Destroying {} resource(s)...", state.resources.len()).blue()
    );

    let result = engine.destroy(&mut state).await?;
    manager.save(&state).await?;

    super::report(&result)
}
