//! `cloudflare_waiting_room_event` resource provider
//!
//! Maps declared attributes onto the waiting room event API and records the
//! returned event as flat attributes.

use crate::client::CloudflareClient;
use crate::error::CloudflareError;
use crate::waiting_room_event::{WaitingRoomEvent, WaitingRoomEventSpec, format_timestamp};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use waitflow_cloud::{Attributes, CloudError, ResourceProvider, ResourceState};

pub const RESOURCE_TYPE: &str = "cloudflare_waiting_room_event";

/// Identifiers needed to address one event through the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIds {
    pub zone_id: String,
    pub waiting_room_id: String,
    pub event_id: String,
}

impl EventIds {
    /// Extract the identifiers from recorded state
    ///
    /// `label` names the resource in a `MissingAttribute` error.
    pub fn from_state(label: &str, state: &ResourceState) -> waitflow_cloud::Result<Self> {
        let required = |key: &str| {
            state
                .attribute_string(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CloudError::MissingAttribute {
                    address: label.to_string(),
                    attribute: key.to_string(),
                })
        };

        Ok(Self {
            zone_id: required("zone_id")?,
            waiting_room_id: required("waiting_room_id")?,
            event_id: required("id")?,
        })
    }

    /// Parse an import id of the form `<zone_id>/<waiting_room_id>/<event_id>`
    pub fn parse_import_id(import_id: &str) -> crate::Result<Self> {
        let parts: Vec<&str> = import_id.split('/').collect();
        match parts.as_slice() {
            [zone_id, waiting_room_id, event_id]
                if !zone_id.is_empty() && !waiting_room_id.is_empty() && !event_id.is_empty() =>
            {
                Ok(Self {
                    zone_id: zone_id.to_string(),
                    waiting_room_id: waiting_room_id.to_string(),
                    event_id: event_id.to_string(),
                })
            }
            _ => Err(CloudflareError::InvalidImportId(import_id.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventResourceConfig {
    zone_id: String,
    waiting_room_id: String,
    #[serde(flatten)]
    spec: WaitingRoomEventSpec,
}

fn decode_config(config: &Attributes) -> crate::Result<EventResourceConfig> {
    let value = serde_json::to_value(config)?;
    serde_json::from_value(value)
        .map_err(|e| CloudflareError::InvalidConfig(format!("{}: {}", RESOURCE_TYPE, e)))
}

/// Attributes read back from the API that configuration never sets
const COMPUTED_ATTRIBUTES: &[&str] = &["created_on", "modified_on"];

/// Flat attributes of an event spec as recorded in state
///
/// Unset optional fields stay absent. Timestamps are RFC3339 UTC.
fn spec_attributes(zone_id: &str, waiting_room_id: &str, spec: &WaitingRoomEventSpec) -> Attributes {
    let mut attributes = Attributes::from([
        ("zone_id".to_string(), json!(zone_id)),
        ("waiting_room_id".to_string(), json!(waiting_room_id)),
        ("name".to_string(), json!(spec.name)),
        (
            "event_start_time".to_string(),
            json!(format_timestamp(&spec.event_start_time)),
        ),
        (
            "event_end_time".to_string(),
            json!(format_timestamp(&spec.event_end_time)),
        ),
        (
            "shuffle_at_event_start".to_string(),
            json!(spec.shuffle_at_event_start),
        ),
        ("suspended".to_string(), json!(spec.suspended)),
    ]);

    let optional = [
        (
            "prequeue_start_time",
            spec.prequeue_start_time.as_ref().map(|t| json!(format_timestamp(t))),
        ),
        ("description", spec.description.as_ref().map(|d| json!(d))),
        (
            "queueing_method",
            spec.queueing_method.map(|m| json!(m.to_string())),
        ),
        (
            "disable_session_renewal",
            spec.disable_session_renewal.map(|b| json!(b)),
        ),
        ("custom_page_html", spec.custom_page_html.as_ref().map(|h| json!(h))),
        ("new_users_per_minute", spec.new_users_per_minute.map(|n| json!(n))),
        ("total_active_users", spec.total_active_users.map(|n| json!(n))),
        ("session_duration", spec.session_duration.map(|n| json!(n))),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            attributes.insert(key.to_string(), value);
        }
    }

    attributes
}

/// Record an API event as resource state
pub fn event_to_state(zone_id: &str, waiting_room_id: &str, event: &WaitingRoomEvent) -> ResourceState {
    let mut state = ResourceState::new(&event.id, RESOURCE_TYPE);
    state.attributes = spec_attributes(zone_id, waiting_room_id, &event.spec);

    for (key, time) in [
        ("created_on", &event.created_on),
        ("modified_on", &event.modified_on),
    ] {
        if let Some(time) = time {
            state.set_attribute(key, json!(format_timestamp(time)));
        }
    }

    state
}

/// Name of a recorded event in error messages
fn instance_label(current: &ResourceState) -> String {
    format!("{} (id {})", RESOURCE_TYPE, current.id)
}

/// Provider for `cloudflare_waiting_room_event`
pub struct WaitingRoomEventResource {
    client: CloudflareClient,
}

impl WaitingRoomEventResource {
    pub fn new(client: CloudflareClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceProvider for WaitingRoomEventResource {
    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    async fn create(&self, config: &Attributes) -> waitflow_cloud::Result<ResourceState> {
        let config = decode_config(config)?;
        let event = self
            .client
            .create_waiting_room_event(&config.zone_id, &config.waiting_room_id, &config.spec)
            .await?;
        Ok(event_to_state(&config.zone_id, &config.waiting_room_id, &event))
    }

    async fn read(&self, current: &ResourceState) -> waitflow_cloud::Result<Option<ResourceState>> {
        let ids = EventIds::from_state(&instance_label(current), current)?;
        match self
            .client
            .waiting_room_event(&ids.zone_id, &ids.waiting_room_id, &ids.event_id)
            .await
        {
            Ok(event) => Ok(Some(event_to_state(
                &ids.zone_id,
                &ids.waiting_room_id,
                &event,
            ))),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Waiting room event {} not found", ids.event_id);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(
        &self,
        current: &ResourceState,
        config: &Attributes,
    ) -> waitflow_cloud::Result<ResourceState> {
        let ids = EventIds::from_state(&instance_label(current), current)?;
        let config = decode_config(config)?;
        if config.zone_id != ids.zone_id || config.waiting_room_id != ids.waiting_room_id {
            return Err(CloudError::InvalidConfig(format!(
                "{}: zone_id and waiting_room_id cannot change in place",
                RESOURCE_TYPE
            )));
        }

        let event = self
            .client
            .update_waiting_room_event(
                &ids.zone_id,
                &ids.waiting_room_id,
                &ids.event_id,
                &config.spec,
            )
            .await?;
        Ok(event_to_state(&ids.zone_id, &ids.waiting_room_id, &event))
    }

    async fn delete(&self, current: &ResourceState) -> waitflow_cloud::Result<()> {
        let ids = EventIds::from_state(&instance_label(current), current)?;
        match self
            .client
            .delete_waiting_room_event(&ids.zone_id, &ids.waiting_room_id, &ids.event_id)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::warn!("Waiting room event {} already deleted", ids.event_id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn import(&self, import_id: &str) -> waitflow_cloud::Result<ResourceState> {
        let ids = EventIds::parse_import_id(import_id)?;
        let event = self
            .client
            .waiting_room_event(&ids.zone_id, &ids.waiting_room_id, &ids.event_id)
            .await?;
        Ok(event_to_state(&ids.zone_id, &ids.waiting_room_id, &event))
    }

    fn normalize(&self, config: &Attributes) -> waitflow_cloud::Result<Attributes> {
        let config = decode_config(config)?;
        Ok(spec_attributes(
            &config.zone_id,
            &config.waiting_room_id,
            &config.spec,
        ))
    }

    fn computed_attributes(&self) -> &[&str] {
        COMPUTED_ATTRIBUTES
    }
}
