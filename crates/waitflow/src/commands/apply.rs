use anyhow::Context;
use colored::Colorize;
use std::path::Path;
use waitflow_cloud::{ActionType, StateManager, parse_config};

pub async fn handle(config_path: &Path, dir: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(config_path)
        .await
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let desired = parse_config(&text)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
    if desired.is_empty() {
        println!(
            "{}",
            "No resources declared; every recorded resource will be deleted.".yellow()
        );
    }

    let engine = super::engine_from_env()?;
    let manager = StateManager::new(dir);
    let mut state = manager.load().await?;

    let plan = engine.plan(&desired, &state)?;
    println!("{} {}", "Plan:".bold(), plan.summary());
    if !plan.has_changes {
        println!("{}", "No changes.".green());
        return Ok(());
    }
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => continue,
        };
        println!("  {} {}", marker, action.description);
    }

    let result = engine.apply(&plan, &mut state).await?;
    // state is saved even after partial failure so created objects stay tracked
    manager.save(&state).await?;
    println!(
        "State saved to {}",
        manager.state_path().display().to_string().cyan()
    );

    super::report(&result)
}
