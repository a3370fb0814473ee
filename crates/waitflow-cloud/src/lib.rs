//! waitflow declarative resource layer
//!
//! This crate maps declarative resource blocks onto CRUD calls of
//! per-resource-type providers and records the result.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              waitflow CLI / acctest              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 waitflow-cloud                   │
//! │  ┌────────────┐  ┌──────────┐  ┌─────────────┐  │
//! │  │ HCL config │─▶│  Engine  │─▶│ State (JSON)│  │
//! │  └────────────┘  └────┬─────┘  └─────────────┘  │
//! │        trait ResourceProvider { create, read,   │
//! │                  update, delete, import }       │
//! └───────────────────────┬─────────────────────────┘
//!                         │
//!                 ┌───────▼────────┐
//!                 │   cloudflare   │
//!                 │   providers    │
//!                 └────────────────┘
//! ```

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use config::parse_config;
pub use engine::Engine;
pub use error::{CloudError, Result};
pub use provider::{Attributes, ProviderRegistry, ResourceConfig, ResourceProvider, ResourceSet};
pub use state::{ResourceState, State, StateManager, flatten_value};
