//! Post-destroy verification
//!
//! After a destroy, every waiting room event that was recorded in state must
//! read back as not found.

use crate::client::CloudflareClient;
use crate::error::VerifyError;
use crate::resource::{EventIds, RESOURCE_TYPE};
use waitflow_cloud::State;

/// Check that no recorded `cloudflare_waiting_room_event` still exists
///
/// One read per recorded instance, in address order. Only a not-found answer
/// counts as destroyed; any other API error fails the check.
pub async fn check_waiting_room_events_destroyed(
    client: &CloudflareClient,
    state: &State,
) -> Result<(), VerifyError> {
    let events = state.resources_of_type(RESOURCE_TYPE);
    tracing::debug!("Verifying {} waiting room event(s) were destroyed", events.len());

    for (address, resource) in events {
        let ids = EventIds::from_state(address, resource)?;

        match client
            .waiting_room_event(&ids.zone_id, &ids.waiting_room_id, &ids.event_id)
            .await
        {
            Ok(_) => {
                return Err(VerifyError::StillExists {
                    address: address.clone(),
                    event_id: ids.event_id,
                });
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} is gone", address);
            }
            Err(source) => {
                return Err(VerifyError::Api {
                    address: address.clone(),
                    source,
                });
            }
        }
    }

    Ok(())
}
