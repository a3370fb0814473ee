pub mod apply;
pub mod check_destroy;
pub mod destroy;
pub mod import;
pub mod render;

use anyhow::Context;
use colored::Colorize;
use waitflow_cloud::{ApplyResult, Engine};
use waitflow_cloud_cloudflare::{CloudflareClient, CloudflareConfig};

/// API client configured from the environment
pub fn client_from_env() -> anyhow::Result<CloudflareClient> {
    let config = CloudflareConfig::from_env().context("Cloudflare credentials are not configured")?;
    Ok(CloudflareClient::new(config))
}

/// Engine with every Cloudflare resource provider registered
pub fn engine_from_env() -> anyhow::Result<Engine> {
    Ok(Engine::new(waitflow_cloud_cloudflare::registry(
        client_from_env()?,
    )))
}

/// Print per-action results and fail when any action failed
pub fn report(result: &ApplyResult) -> anyhow::Result<()> {
    for action in &result.succeeded {
        println!("  {} {}", "✓".green(), action.message);
    }
    for action in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            action.action_id,
            action.error.as_deref().unwrap_or("unknown error")
        );
    }

    if result.is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} action(s) failed: {}",
            result.failed.len(),
            result.failure_summary()
        ))
    }
}
