//! Type id → instance resolution

use crate::actions::Action;
use crate::detector::IntrusionDetector;
use crate::error::InstantiationError;
use crate::plugin::{ActionModule, TypeEntry, TypeKind, TypeRegistry};

/// Action instance together with its auto-load registration
pub struct Annotated {
    pub action: Box<dyn Action>,
    /// Registration name, empty when the type carries no attribute
    pub name: String,
    pub auto_load: bool,
}

/// Create a new action from a type id
pub fn instantiate(
    registry: &TypeRegistry,
    type_id: &str,
) -> Result<Box<dyn Action>, InstantiationError> {
    let (_, entry) = registry
        .resolve(type_id)
        .ok_or_else(|| InstantiationError::TypeNotFound(type_id.to_string()))?;
    construct_action(entry)
}

/// Create a new action from a type id and read its auto-load attribute
pub fn instantiate_annotated(
    registry: &TypeRegistry,
    type_id: &str,
) -> Result<Annotated, InstantiationError> {
    let (module, entry) = registry
        .resolve(type_id)
        .ok_or_else(|| InstantiationError::TypeNotFound(type_id.to_string()))?;
    instantiate_entry(module, entry)
}

/// Annotated instantiation of an entry already enumerated from `module`
pub fn instantiate_entry(
    module: &ActionModule,
    entry: &TypeEntry,
) -> Result<Annotated, InstantiationError> {
    let action = construct_action(entry)?;
    let (name, auto_load) = module
        .attribute(entry.type_id())
        .map(|attr| (attr.name.to_string(), attr.auto_load))
        .unwrap_or_default();

    Ok(Annotated {
        action,
        name,
        auto_load,
    })
}

/// Create a detector from a type id
pub fn instantiate_detector(
    registry: &TypeRegistry,
    type_id: &str,
) -> Result<Box<dyn IntrusionDetector>, InstantiationError> {
    let (_, entry) = registry
        .resolve(type_id)
        .ok_or_else(|| InstantiationError::TypeNotFound(type_id.to_string()))?;

    match entry.kind() {
        TypeKind::Detector(factory) => factory().map_err(|reason| {
            InstantiationError::ConstructionFailed {
                type_id: type_id.to_string(),
                reason,
            }
        }),
        _ => Err(InstantiationError::MissingCapability {
            type_id: type_id.to_string(),
            expected: "an intrusion detector",
        }),
    }
}

fn construct_action(entry: &TypeEntry) -> Result<Box<dyn Action>, InstantiationError> {
    match entry.kind() {
        TypeKind::Action(factory) => {
            factory().map_err(|reason| InstantiationError::ConstructionFailed {
                type_id: entry.type_id().to_string(),
                reason,
            })
        }
        _ => Err(InstantiationError::MissingCapability {
            type_id: entry.type_id().to_string(),
            expected: "an action",
        }),
    }
}
