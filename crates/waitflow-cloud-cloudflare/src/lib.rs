//! Cloudflare provider for waitflow
//!
//! This crate implements the `cloudflare_waiting_room_event` resource on top
//! of the Cloudflare v4 API, together with the configuration renderer and the
//! post-destroy check used by its acceptance tests.
//!
//! # Requirements
//!
//! - `CLOUDFLARE_API_TOKEN` for API access
//! - `CLOUDFLARE_API_BASE_URL` (optional) to point at another endpoint
//!
//! # Example
//!
//! ```ignore
//! use waitflow_cloud::{Engine, ProviderRegistry, State, parse_config};
//! use waitflow_cloud_cloudflare::{CloudflareClient, CloudflareConfig, template};
//!
//! let client = CloudflareClient::new(CloudflareConfig::from_env()?);
//! let engine = Engine::new(waitflow_cloud_cloudflare::registry(client.clone()));
//!
//! let config = template::waiting_room_event_config(
//!     "example", "launch", &zone_id, &waiting_room_id, start, end,
//! )?;
//! let mut state = State::new();
//! let plan = engine.plan(&parse_config(&config)?, &state)?;
//! engine.apply(&plan, &mut state).await?;
//!
//! engine.destroy(&mut state).await?;
//! ```

pub mod client;
pub mod error;
pub mod resource;
pub mod template;
pub mod verify;
pub mod waiting_room_event;

pub use client::{CloudflareClient, CloudflareConfig};
pub use error::{CloudflareError, Result, VerifyError};
pub use resource::{EventIds, RESOURCE_TYPE, WaitingRoomEventResource};
pub use template::{ConfigRenderer, WaitingRoomEventParams, waiting_room_event_config};
pub use verify::check_waiting_room_events_destroyed;
pub use waiting_room_event::{QueueingMethod, WaitingRoomEvent, WaitingRoomEventSpec};

use waitflow_cloud::ProviderRegistry;

/// Registry with every Cloudflare resource provider
pub fn registry(client: CloudflareClient) -> ProviderRegistry {
    ProviderRegistry::new().with(WaitingRoomEventResource::new(client))
}
