//! Plan and apply declared resources against recorded state

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::error::{CloudError, Result};
use crate::provider::{ProviderRegistry, ResourceSet};
use crate::state::State;

/// Drives providers from a desired [`ResourceSet`] and recorded [`State`]
pub struct Engine {
    registry: ProviderRegistry,
}

impl Engine {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Calculate the actions needed to move `state` to `desired`
    pub fn plan(&self, desired: &ResourceSet, state: &State) -> Result<Plan> {
        let mut actions = Vec::new();

        let mut addresses: Vec<&String> = desired.resources.keys().collect();
        addresses.sort();

        for address in addresses {
            let resource = &desired.resources[address];
            let provider = self.registry.get(&resource.resource_type)?;
            let config = provider.normalize(&resource.attributes)?;

            let action_type = match state.get_resource(address) {
                None => ActionType::Create,
                Some(current) if current.matches(&config, provider.computed_attributes()) => {
                    ActionType::NoOp
                }
                Some(_) => ActionType::Update,
            };
            let config = (action_type != ActionType::NoOp).then_some(config);
            actions.push(Action::new(
                action_type,
                &resource.resource_type,
                address,
                config,
            ));
        }

        let mut orphaned: Vec<(&String, &str)> = state
            .resources
            .iter()
            .filter(|(address, _)| desired.get(address).is_none())
            .map(|(address, r)| (address, r.resource_type.as_str()))
            .collect();
        orphaned.sort();

        for (address, resource_type) in orphaned {
            actions.push(Action::new(
                ActionType::Delete,
                resource_type,
                address,
                None,
            ));
        }

        let plan = Plan::new(actions);
        tracing::info!("Plan: {}", plan.summary());
        Ok(plan)
    }

    /// Apply the planned actions, recording the outcome in `state`
    pub async fn apply(&self, plan: &Plan, state: &mut State) -> Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }
            match self.apply_action(action, state).await {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(e) => {
                    tracing::warn!("{} failed: {}", action.id, e);
                    result.add_failure(action.id.clone(), e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn apply_action(&self, action: &Action, state: &mut State) -> Result<String> {
        let provider = self.registry.get(&action.resource_type)?;

        match action.action_type {
            ActionType::Create => {
                tracing::info!("Creating {}", action.address);
                let config = action.config.clone().unwrap_or_default();
                let created = provider.create(&config).await?;
                let message = format!("{} created with id {}", action.address, created.id);
                state.set_resource(action.address.clone(), created);
                Ok(message)
            }
            ActionType::Update => {
                tracing::info!("Updating {}", action.address);
                let current = state
                    .get_resource(&action.address)
                    .cloned()
                    .ok_or_else(|| CloudError::ResourceNotFound(action.address.clone()))?;
                let config = action.config.clone().unwrap_or_default();
                let updated = provider.update(&current, &config).await?;
                state.set_resource(action.address.clone(), updated);
                Ok(format!("{} updated", action.address))
            }
            ActionType::Delete => {
                tracing::info!("Deleting {}", action.address);
                let current = state
                    .get_resource(&action.address)
                    .cloned()
                    .ok_or_else(|| CloudError::ResourceNotFound(action.address.clone()))?;
                provider.delete(&current).await?;
                state.remove_resource(&action.address);
                Ok(format!("{} deleted", action.address))
            }
            ActionType::NoOp => Ok(format!("{} unchanged", action.address)),
        }
    }

    /// Delete every recorded resource
    pub async fn destroy(&self, state: &mut State) -> Result<ApplyResult> {
        let plan = self.plan(&ResourceSet::new(), state)?;
        self.apply(&plan, state).await
    }

    /// Re-read every recorded resource, dropping those that vanished remotely
    pub async fn refresh(&self, state: &mut State) -> Result<()> {
        let mut addresses: Vec<String> = state.resources.keys().cloned().collect();
        addresses.sort();

        for address in addresses {
            let Some(current) = state.get_resource(&address).cloned() else {
                continue;
            };
            let provider = self.registry.get(&current.resource_type)?;
            match provider.read(&current).await? {
                Some(fresh) => state.set_resource(address, fresh),
                None => {
                    tracing::warn!("{} no longer exists, removing from state", address);
                    state.remove_resource(&address);
                }
            }
        }
        Ok(())
    }

    /// Record an existing remote object under `address`
    pub async fn import(&self, address: &str, import_id: &str, state: &mut State) -> Result<()> {
        let (resource_type, _) = address.split_once('.').ok_or_else(|| {
            CloudError::InvalidConfig(format!("invalid resource address: {address}"))
        })?;
        if state.get_resource(address).is_some() {
            return Err(CloudError::ResourceAlreadyExists(address.to_string()));
        }

        let provider = self.registry.get(resource_type)?;
        let imported = provider.import(import_id).await?;
        tracing::info!("Imported {} as {}", import_id, address);
        state.set_resource(address.to_string(), imported);
        Ok(())
    }
}
