//! Attribute checks run against recorded state after each step

use thiserror::Error;
use waitflow_cloud::State;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheckError {
    #[error("Not found: {0} in state")]
    ResourceNotFound(String),

    #[error("{address}: Attribute '{key}' expected {expected:?}, got {actual:?}")]
    AttributeMismatch {
        address: String,
        key: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("{address}: Attribute '{key}' found when not expected (value {value:?})")]
    UnexpectedAttribute {
        address: String,
        key: String,
        value: String,
    },
}

/// A check over recorded state
pub type CheckFn = Box<dyn Fn(&State) -> Result<(), CheckError> + Send + Sync>;

/// Require `address` to record `key` with the flattened value `value`
pub fn check_resource_attr(
    address: impl Into<String>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> CheckFn {
    let (address, key, expected) = (address.into(), key.into(), value.into());
    Box::new(move |state| {
        let resource = state
            .get_resource(&address)
            .ok_or_else(|| CheckError::ResourceNotFound(address.clone()))?;

        let actual = resource.attribute_string(&key);
        if actual.as_deref() == Some(expected.as_str()) {
            Ok(())
        } else {
            Err(CheckError::AttributeMismatch {
                address: address.clone(),
                key: key.clone(),
                expected: expected.clone(),
                actual,
            })
        }
    })
}

/// Require `address` to have no value at all for `key`
///
/// An empty string counts as a value.
pub fn check_no_resource_attr(address: impl Into<String>, key: impl Into<String>) -> CheckFn {
    let (address, key) = (address.into(), key.into());
    Box::new(move |state| {
        let resource = state
            .get_resource(&address)
            .ok_or_else(|| CheckError::ResourceNotFound(address.clone()))?;

        match resource.attribute_string(&key) {
            None => Ok(()),
            Some(value) => Err(CheckError::UnexpectedAttribute {
                address: address.clone(),
                key: key.clone(),
                value,
            }),
        }
    })
}

/// Run checks in order, stopping at the first failure
pub fn compose(checks: Vec<CheckFn>) -> CheckFn {
    Box::new(move |state| checks.iter().try_for_each(|check| check(state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use waitflow_cloud::ResourceState;

    const ADDRESS: &str = "cloudflare_waiting_room_event.abc";

    fn state() -> State {
        let mut state = State::new();
        state.set_resource(
            ADDRESS.to_string(),
            ResourceState::new("evt-1", "cloudflare_waiting_room_event")
                .with_attribute("suspended", serde_json::json!(true))
                .with_attribute("total_active_users", serde_json::json!(405))
                .with_attribute("description", serde_json::json!("")),
        );
        state
    }

    #[test]
    fn test_check_resource_attr() {
        let state = state();
        assert!(check_resource_attr(ADDRESS, "suspended", "true")(&state).is_ok());
        assert!(check_resource_attr(ADDRESS, "total_active_users", "405")(&state).is_ok());
        assert!(check_resource_attr(ADDRESS, "id", "evt-1")(&state).is_ok());

        assert_eq!(
            check_resource_attr(ADDRESS, "suspended", "false")(&state),
            Err(CheckError::AttributeMismatch {
                address: ADDRESS.to_string(),
                key: "suspended".to_string(),
                expected: "false".to_string(),
                actual: Some("true".to_string()),
            })
        );
    }

    #[test]
    fn test_check_missing_resource() {
        assert_eq!(
            check_resource_attr("t.missing", "a", "b")(&state()),
            Err(CheckError::ResourceNotFound("t.missing".to_string()))
        );
    }

    #[test]
    fn test_check_no_resource_attr() {
        let state = state();
        assert!(check_no_resource_attr(ADDRESS, "prequeue_start_time")(&state).is_ok());
        // an empty string is still a value
        assert!(check_no_resource_attr(ADDRESS, "description")(&state).is_err());
    }

    #[test]
    fn test_compose_stops_at_first_failure() {
        let check = compose(vec![
            check_resource_attr(ADDRESS, "suspended", "true"),
            check_resource_attr(ADDRESS, "total_active_users", "1"),
            check_resource_attr(ADDRESS, "never", "reached"),
        ]);

        match check(&state()) {
            Err(CheckError::AttributeMismatch { key, .. }) => {
                assert_eq!(key, "total_active_users")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
