//! Recorded state of applied resources
//!
//! Manages the `.waitflow/state.json` file which tracks every resource
//! instance created by an apply, keyed by its address.

use crate::error::{CloudError, Result};
use crate::provider::Attributes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".waitflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";

/// All recorded resource instances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Resources indexed by address (`type.name`)
    pub resources: HashMap<String, ResourceState>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: HashMap::new(),
        }
    }
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded instances of one resource type, ordered by address
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(&String, &ResourceState)> {
        let mut found: Vec<_> = self
            .resources
            .iter()
            .filter(|(_, r)| r.resource_type == resource_type)
            .collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        found
    }

    /// Add or update a resource
    pub fn set_resource(&mut self, address: String, state: ResourceState) {
        self.resources.insert(address, state);
        self.updated_at = Utc::now();
    }

    /// Remove a resource
    pub fn remove_resource(&mut self, address: &str) -> Option<ResourceState> {
        let result = self.resources.remove(address);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn get_resource(&self, address: &str) -> Option<&ResourceState> {
        self.resources.get(address)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Recorded state of a single resource instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-assigned id
    pub id: String,

    /// Resource type
    pub resource_type: String,

    /// Configured and computed attributes
    pub attributes: Attributes,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Flattened string form of an attribute (`true`, `405`, `fifo`).
    ///
    /// `None` when the attribute is absent or null.
    pub fn attribute_string(&self, key: &str) -> Option<String> {
        if key == "id" {
            return Some(self.id.clone());
        }
        self.attributes.get(key).and_then(flatten_value)
    }

    /// Whether the recorded attributes are exactly the configured ones
    ///
    /// Null counts as absent. Keys listed in `computed` are ignored on the
    /// recorded side.
    pub fn matches(&self, config: &Attributes, computed: &[&str]) -> bool {
        let configured_held = config
            .iter()
            .filter(|(_, v)| !v.is_null())
            .all(|(k, v)| self.attributes.get(k) == Some(v));

        let nothing_unconfigured = self
            .attributes
            .iter()
            .filter(|(k, v)| !v.is_null() && !computed.contains(&k.as_str()))
            .all(|(k, _)| config.get(k).is_some_and(|v| !v.is_null()));

        configured_held && nothing_unconfigured
    }
}

/// Flatten a JSON value into its recorded string form
pub fn flatten_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// State manager for reading/writing state files
pub struct StateManager {
    /// Working directory holding `.waitflow/`
    root: PathBuf,
}

impl StateManager {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Path of the state file
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state
    pub async fn load(&self) -> Result<State> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(State::new());
        }

        let state = read_state(&path).await?;
        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Load the state as it was before the last save, if a backup exists
    pub async fn load_backup(&self) -> Result<Option<State>> {
        let path = self.backup_path();
        if !path.exists() {
            return Ok(None);
        }
        read_state(&path).await.map(Some)
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &State) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }
}

async fn read_state(path: &Path) -> Result<State> {
    let content = fs::read_to_string(path).await?;
    let state: State = serde_json::from_str(&content)?;

    if state.version > STATE_VERSION {
        return Err(CloudError::StateError(format!(
            "State file version {} is newer than supported version {}",
            state.version, STATE_VERSION
        )));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = State::new();
        state.set_resource(
            "cloudflare_waiting_room_event.abc".to_string(),
            ResourceState::new("evt-1", "cloudflare_waiting_room_event")
                .with_attribute("zone_id", serde_json::json!("zone123")),
        );

        manager.save(&state).await.unwrap();
        manager.save(&state).await.unwrap();
        assert!(manager.backup_path().exists());

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.resources.len(), 1);
        assert!(
            loaded
                .resources
                .contains_key("cloudflare_waiting_room_event.abc")
        );
    }

    #[tokio::test]
    async fn test_load_backup_after_destroy() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());
        assert!(manager.load_backup().await.unwrap().is_none());

        let mut state = State::new();
        state.set_resource(
            "cloudflare_waiting_room_event.abc".to_string(),
            ResourceState::new("evt-1", "cloudflare_waiting_room_event"),
        );
        manager.save(&state).await.unwrap();
        state.remove_resource("cloudflare_waiting_room_event.abc");
        manager.save(&state).await.unwrap();

        assert!(manager.load().await.unwrap().is_empty());
        let previous = manager.load_backup().await.unwrap().unwrap();
        assert_eq!(
            previous
                .get_resource("cloudflare_waiting_room_event.abc")
                .map(|r| r.id.as_str()),
            Some("evt-1")
        );
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_newer_version_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = State::new();
        state.version = STATE_VERSION + 1;
        manager.save(&state).await.unwrap();

        assert!(matches!(
            manager.load().await,
            Err(CloudError::StateError(_))
        ));
    }

    #[test]
    fn test_attribute_string_flattening() {
        let state = ResourceState::new("evt-1", "cloudflare_waiting_room_event")
            .with_attribute("suspended", serde_json::json!(true))
            .with_attribute("total_active_users", serde_json::json!(405))
            .with_attribute("queueing_method", serde_json::json!("fifo"))
            .with_attribute("prequeue_start_time", serde_json::Value::Null)
            .with_attribute("description", serde_json::json!(""));

        assert_eq!(state.attribute_string("id").as_deref(), Some("evt-1"));
        assert_eq!(state.attribute_string("suspended").as_deref(), Some("true"));
        assert_eq!(
            state.attribute_string("total_active_users").as_deref(),
            Some("405")
        );
        assert_eq!(
            state.attribute_string("queueing_method").as_deref(),
            Some("fifo")
        );
        // null and missing are both absent, empty string is present
        assert_eq!(state.attribute_string("prequeue_start_time"), None);
        assert_eq!(state.attribute_string("custom_page_html"), None);
        assert_eq!(state.attribute_string("description").as_deref(), Some(""));
    }

    #[test]
    fn test_matches() {
        let state = ResourceState::new("evt-1", "cloudflare_waiting_room_event")
            .with_attribute("name", serde_json::json!("evt"))
            .with_attribute("description", serde_json::json!("my desc"))
            .with_attribute("created_on", serde_json::json!("2024-05-01T00:00:00Z"));

        let mut config = Attributes::new();
        config.insert("name".to_string(), serde_json::json!("evt"));
        config.insert("description".to_string(), serde_json::json!("my desc"));
        assert!(state.matches(&config, &["created_on"]));

        // computed keys count unless declared
        assert!(!state.matches(&config, &[]));

        // a configured attribute dropped from config is a change
        config.remove("description");
        assert!(!state.matches(&config, &["created_on"]));

        config.insert("description".to_string(), serde_json::Value::Null);
        assert!(!state.matches(&config, &["created_on"]));

        config.insert("description".to_string(), serde_json::json!("other"));
        assert!(!state.matches(&config, &["created_on"]));
    }

    #[test]
    fn test_resources_of_type_sorted() {
        let mut state = State::new();
        state.set_resource(
            "cloudflare_waiting_room_event.b".to_string(),
            ResourceState::new("2", "cloudflare_waiting_room_event"),
        );
        state.set_resource(
            "cloudflare_waiting_room_event.a".to_string(),
            ResourceState::new("1", "cloudflare_waiting_room_event"),
        );
        state.set_resource(
            "cloudflare_waiting_room.a".to_string(),
            ResourceState::new("3", "cloudflare_waiting_room"),
        );

        let events = state.resources_of_type("cloudflare_waiting_room_event");
        let ids: Vec<&str> = events.iter().map(|(_, r)| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
