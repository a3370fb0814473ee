//! Resource provider trait and registry

use crate::error::{CloudError, Result};
use crate::state::ResourceState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Flat attribute map of a resource, as configured or as recorded
pub type Attributes = HashMap<String, serde_json::Value>;

/// CRUD mapping for a single resource type
///
/// Each resource kind (e.g. `cloudflare_waiting_room_event`) has exactly one
/// implementation, registered in a [`ProviderRegistry`] under its type tag.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Resource type tag handled by this provider
    fn resource_type(&self) -> &str;

    /// Create the remote object from configured attributes
    async fn create(&self, config: &Attributes) -> Result<ResourceState>;

    /// Read the remote object back. `Ok(None)` means it no longer exists.
    async fn read(&self, current: &ResourceState) -> Result<Option<ResourceState>>;

    /// Update the remote object to match the configured attributes
    async fn update(&self, current: &ResourceState, config: &Attributes) -> Result<ResourceState>;

    /// Delete the remote object
    async fn delete(&self, current: &ResourceState) -> Result<()>;

    /// Build recorded state for an existing remote object from an import id
    async fn import(&self, import_id: &str) -> Result<ResourceState>;

    /// Configured attributes in the form `read` records them
    ///
    /// Planning compares this against recorded state, so defaults and value
    /// formats must come out exactly as the provider stores them.
    fn normalize(&self, config: &Attributes) -> Result<Attributes> {
        Ok(config.clone())
    }

    /// Recorded attributes set by the remote side, never configured
    fn computed_attributes(&self) -> &[&str] {
        &[]
    }
}

/// Dispatches resource types to their providers
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ResourceProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own resource type
    pub fn register<P: ResourceProvider + 'static>(&mut self, provider: P) {
        let key = provider.resource_type().to_string();
        tracing::debug!("Registered provider for {}", key);
        self.providers.insert(key, Arc::new(provider));
    }

    pub fn with<P: ResourceProvider + 'static>(mut self, provider: P) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, resource_type: &str) -> Result<&dyn ResourceProvider> {
        self.providers
            .get(resource_type)
            .map(|p| p.as_ref())
            .ok_or_else(|| CloudError::ProviderNotFound(resource_type.to_string()))
    }
}

/// Set of resources declared by a configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Resources indexed by address (`type.name`)
    pub resources: HashMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: ResourceConfig) {
        self.resources.insert(resource.address(), resource);
    }

    pub fn get(&self, address: &str) -> Option<&ResourceConfig> {
        self.resources.get(address)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// A single declared resource block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "cloudflare_waiting_room_event")
    pub resource_type: String,

    /// Local name of the block
    pub name: String,

    /// Literal attribute values from the configuration
    pub attributes: Attributes,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            attributes,
        }
    }

    /// Full resource address (`type.name`)
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}
