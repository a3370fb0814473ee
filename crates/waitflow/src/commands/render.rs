use anyhow::Context;
use chrono::{DateTime, Duration, Utc};

pub fn handle(
    resource_name: &str,
    name: &str,
    zone_id: &str,
    waiting_room_id: &str,
    start: Option<DateTime<Utc>>,
    duration_minutes: i64,
) -> anyhow::Result<()> {
    if duration_minutes <= 0 {
        anyhow::bail!("--duration-minutes must be positive, got {}", duration_minutes);
    }

    let start = start.unwrap_or_else(Utc::now);
    let end = Duration::try_minutes(duration_minutes)
        .and_then(|duration| start.checked_add_signed(duration))
        .with_context(|| {
            format!(
                "--duration-minutes {} puts the event end out of range",
                duration_minutes
            )
        })?;

    let config = waitflow_cloud_cloudflare::waiting_room_event_config(
        resource_name,
        name,
        zone_id,
        waiting_room_id,
        start,
        end,
    )?;

    println!("{}", config.trim());
    Ok(())
}
