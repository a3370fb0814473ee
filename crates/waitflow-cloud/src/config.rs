//! Declarative configuration parsing
//!
//! Reads HCL `resource "<type>" "<name>" { ... }` blocks into a
//! [`ResourceSet`]. Only literal attribute values are supported.

use crate::error::{CloudError, Result};
use crate::provider::{Attributes, ResourceConfig, ResourceSet};
use hcl::Expression;

/// Parse configuration text into the set of declared resources
pub fn parse_config(text: &str) -> Result<ResourceSet> {
    let body = hcl::parse(text)?;
    let mut set = ResourceSet::new();

    for block in body.blocks() {
        if block.identifier() != "resource" {
            tracing::warn!("Ignoring unsupported block: {}", block.identifier());
            continue;
        }

        let [resource_type, name] = block.labels() else {
            return Err(CloudError::InvalidConfig(format!(
                "resource block needs exactly two labels, got {}",
                block.labels().len()
            )));
        };
        let (resource_type, name) = (resource_type.as_str(), name.as_str());

        let mut attributes = Attributes::new();
        for attr in block.body().attributes() {
            let value = literal_value(attr.expr()).ok_or_else(|| {
                CloudError::InvalidConfig(format!(
                    "{}.{}: attribute `{}` must be a literal value",
                    resource_type,
                    name,
                    attr.key()
                ))
            })?;
            attributes.insert(attr.key().to_string(), value);
        }

        let resource = ResourceConfig::new(resource_type, name, attributes);
        if set.get(&resource.address()).is_some() {
            return Err(CloudError::InvalidConfig(format!(
                "duplicate resource address: {}",
                resource.address()
            )));
        }
        tracing::debug!("Parsed resource {}", resource.address());
        set.add(resource);
    }

    Ok(set)
}

fn literal_value(expr: &Expression) -> Option<serde_json::Value> {
    match expr {
        Expression::Null => Some(serde_json::Value::Null),
        Expression::Bool(b) => Some(serde_json::Value::Bool(*b)),
        Expression::String(s) => Some(serde_json::Value::String(s.clone())),
        Expression::Number(n) => match n.as_i64() {
            Some(i) => Some(serde_json::Value::from(i)),
            None => n
                .as_f64()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number),
        },
        _ => None,
    }
}
