use colored::Colorize;
use std::path::Path;
use waitflow_cloud::StateManager;
use waitflow_cloud_cloudflare::{RESOURCE_TYPE, check_waiting_room_events_destroyed};

/// Verify against the state backup when the live state is already empty
///
/// A destroy leaves an empty `state.json` and keeps the previous file as
/// `state.json.backup`, which still lists the destroyed events.
pub async fn handle(dir: &Path) -> anyhow::Result<()> {
    let manager = StateManager::new(dir);
    let mut state = manager.load().await?;
    if state.is_empty() {
        if let Some(previous) = manager.load_backup().await? {
            state = previous;
        }
    }

    let count = state.resources_of_type(RESOURCE_TYPE).len();
    if count == 0 {
        println!("{}", "No waiting room events recorded.".green());
        return Ok(());
    }

    let client = super::client_from_env()?;
    println!(
        "{}",
        format!("Checking {} waiting room event(s)...", count).blue()
    );
    check_waiting_room_events_destroyed(&client, &state).await?;

    println!("{}", "✓ All waiting room events are destroyed".green().bold());
    Ok(())
}
