//! Waiting room events
//!
//! A waiting room event is a scheduled, time-bounded override of a waiting
//! room's admission settings. Fields left as `None` inherit the value of the
//! parent waiting room.

use crate::client::CloudflareClient;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Admission policy applied while the event is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueingMethod {
    Fifo,
    Random,
    Passthrough,
    Reject,
}

impl std::fmt::Display for QueueingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueingMethod::Fifo => write!(f, "fifo"),
            QueueingMethod::Random => write!(f, "random"),
            QueueingMethod::Passthrough => write!(f, "passthrough"),
            QueueingMethod::Reject => write!(f, "reject"),
        }
    }
}

/// Configurable fields of a waiting room event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingRoomEventSpec {
    pub name: String,

    pub event_start_time: DateTime<Utc>,

    pub event_end_time: DateTime<Utc>,

    /// When set, users arriving before the event start are queued from here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prequeue_start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queueing_method: Option<QueueingMethod>,

    #[serde(default)]
    pub shuffle_at_event_start: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_session_renewal: Option<bool>,

    #[serde(default)]
    pub suspended: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_page_html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_users_per_minute: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_active_users: Option<u32>,

    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<u32>,
}

/// A waiting room event as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingRoomEvent {
    pub id: String,

    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub spec: WaitingRoomEventSpec,
}

/// Format a timestamp as RFC3339 in UTC with second precision
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn events_path(zone_id: &str, waiting_room_id: &str) -> String {
    format!("/zones/{}/waiting_rooms/{}/events", zone_id, waiting_room_id)
}

impl CloudflareClient {
    /// Create a waiting room event
    pub async fn create_waiting_room_event(
        &self,
        zone_id: &str,
        waiting_room_id: &str,
        spec: &WaitingRoomEventSpec,
    ) -> Result<WaitingRoomEvent> {
        let url = self.url(&events_path(zone_id, waiting_room_id));
        tracing::debug!("POST {}", url);

        let event: WaitingRoomEvent = self
            .send(
                self.http().post(&url).json(spec),
                &format!("waiting room {}", waiting_room_id),
            )
            .await?;

        tracing::info!("Created waiting room event {} ({})", event.spec.name, event.id);
        Ok(event)
    }

    /// Fetch a single waiting room event by id
    pub async fn waiting_room_event(
        &self,
        zone_id: &str,
        waiting_room_id: &str,
        event_id: &str,
    ) -> Result<WaitingRoomEvent> {
        let url = self.url(&format!(
            "{}/{}",
            events_path(zone_id, waiting_room_id),
            event_id
        ));
        tracing::debug!("GET {}", url);

        self.send(
            self.http().get(&url),
            &format!("waiting room event {}", event_id),
        )
        .await
    }

    /// List all events of a waiting room
    pub async fn list_waiting_room_events(
        &self,
        zone_id: &str,
        waiting_room_id: &str,
    ) -> Result<Vec<WaitingRoomEvent>> {
        let url = self.url(&events_path(zone_id, waiting_room_id));
        tracing::debug!("GET {}", url);

        self.send(
            self.http().get(&url),
            &format!("waiting room {}", waiting_room_id),
        )
        .await
    }

    /// Replace the configurable fields of a waiting room event
    pub async fn update_waiting_room_event(
        &self,
        zone_id: &str,
        waiting_room_id: &str,
        event_id: &str,
        spec: &WaitingRoomEventSpec,
    ) -> Result<WaitingRoomEvent> {
        let url = self.url(&format!(
            "{}/{}",
            events_path(zone_id, waiting_room_id),
            event_id
        ));
        tracing::debug!("PUT {}", url);

        let event: WaitingRoomEvent = self
            .send(
                self.http().put(&url).json(spec),
                &format!("waiting room event {}", event_id),
            )
            .await?;

        tracing::info!("Updated waiting room event {}", event.id);
        Ok(event)
    }

    /// Delete a waiting room event
    pub async fn delete_waiting_room_event(
        &self,
        zone_id: &str,
        waiting_room_id: &str,
        event_id: &str,
    ) -> Result<()> {
        let url = self.url(&format!(
            "{}/{}",
            events_path(zone_id, waiting_room_id),
            event_id
        ));
        tracing::debug!("DELETE {}", url);

        let _deleted: DeleteResult = self
            .send(
                self.http().delete(&url),
                &format!("waiting room event {}", event_id),
            )
            .await?;

        tracing::info!("Deleted waiting room event {}", event_id);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DeleteResult {
    #[allow(dead_code)]
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_drops_subseconds() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(format_timestamp(&t), "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_event_deserialize_api_payload() {
        let body = r#"{
            "id": "25756b2dfe6e378a06b033b670413757",
            "created_on": "2014-01-01T05:20:00.12345Z",
            "modified_on": "2014-01-01T05:20:00.12345Z",
            "name": "production_webinar_event",
            "event_start_time": "2021-09-28T17:00:00.000Z",
            "event_end_time": "2021-09-28T18:00:00.000+01:00",
            "prequeue_start_time": null,
            "description": "Production event - DO NOT MODIFY",
            "queueing_method": "random",
            "shuffle_at_event_start": true,
            "disable_session_renewal": null,
            "suspended": false,
            "custom_page_html": null,
            "new_users_per_minute": 200,
            "total_active_users": null,
            "session_duration": null
        }"#;

        let event: WaitingRoomEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.spec.name, "production_webinar_event");
        assert_eq!(event.spec.queueing_method, Some(QueueingMethod::Random));
        assert_eq!(event.spec.prequeue_start_time, None);
        assert_eq!(event.spec.total_active_users, None);
        assert_eq!(
            format_timestamp(&event.spec.event_end_time),
            "2021-09-28T17:00:00Z"
        );
    }

    #[test]
    fn test_spec_serialization_skips_unset_overrides() {
        let spec = WaitingRoomEventSpec {
            name: "evt".to_string(),
            event_start_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            event_end_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 5, 0).unwrap(),
            prequeue_start_time: None,
            description: None,
            queueing_method: Some(QueueingMethod::Fifo),
            shuffle_at_event_start: false,
            disable_session_renewal: None,
            suspended: true,
            custom_page_html: None,
            new_users_per_minute: None,
            total_active_users: Some(405),
            session_duration: None,
        };

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["queueing_method"], "fifo");
        assert_eq!(json["total_active_users"], 405);
        assert!(json.get("prequeue_start_time").is_none());
        assert!(json.get("new_users_per_minute").is_none());
    }
}
