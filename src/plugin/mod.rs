//! Action modules and the type registry
//!
//! A module is an independently registered unit exposing candidate types
//! under fully qualified identifiers. Each entry is either an action factory,
//! a detector factory or an opaque type that is neither (scanning skips those).
//! Auto-load attributes live in a per-module side-table keyed by type id.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::actions::{
    Action, ActionAttribute, ActionType, BlockAction, LockAction, LogAction, LogoutAction,
};
use crate::detector::{DetectorType, IntrusionDetector, ThresholdDetector};

/// Name of the module holding the built-in actions
pub const BUILTIN_MODULE: &str = "ids_loader";

/// Pattern selecting the built-in actions
pub const BUILTIN_ACTIONS: &str = "ids_loader::actions::*";

/// Parameterless action constructor
pub type ActionFactory = Arc<dyn Fn() -> Result<Box<dyn Action>, String> + Send + Sync>;

/// Parameterless detector constructor
pub type DetectorFactory =
    Arc<dyn Fn() -> Result<Box<dyn IntrusionDetector>, String> + Send + Sync>;

/// What a registered type can be instantiated as
#[derive(Clone)]
pub enum TypeKind {
    Action(ActionFactory),
    Detector(DetectorFactory),
    /// Known type without a usable capability
    Opaque,
}

impl TypeKind {
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Action(_) => "action",
            TypeKind::Detector(_) => "detector",
            TypeKind::Opaque => "type",
        }
    }
}

/// A type exposed by a module
#[derive(Clone)]
pub struct TypeEntry {
    type_id: String,
    kind: TypeKind,
}

impl TypeEntry {
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("type_id", &self.type_id)
            .field("kind", &self.kind.label())
            .finish()
    }
}

/// Registration table of a pluggable module
#[derive(Debug, Clone)]
pub struct ActionModule {
    name: String,
    types: Vec<TypeEntry>,
    attributes: HashMap<String, ActionAttribute>,
}

impl ActionModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            types: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// Module exposing the built-in actions and the default detector
    pub fn builtin() -> Self {
        Self::new(BUILTIN_MODULE)
            .with_action::<LogAction>()
            .with_action::<BlockAction>()
            .with_action::<LockAction>()
            .with_action::<LogoutAction>()
            .with_type("ids_loader::actions::ActionContext")
            .with_detector::<ThresholdDetector>()
    }

    pub fn with_action<T: ActionType>(mut self) -> Self {
        self.register_action::<T>();
        self
    }

    pub fn with_detector<T: DetectorType>(mut self) -> Self {
        self.register_detector::<T>();
        self
    }

    pub fn with_type(mut self, type_id: &str) -> Self {
        self.insert(type_id, TypeKind::Opaque);
        self
    }

    /// Register a statically known action type
    pub fn register_action<T: ActionType>(&mut self) {
        let factory: ActionFactory =
            Arc::new(|| T::create().map(|action| Box::new(action) as Box<dyn Action>));
        self.register_action_factory(T::TYPE_ID, factory, T::REGISTRATION);
    }

    /// Register an action constructor under an explicit identifier
    pub fn register_action_factory(
        &mut self,
        type_id: &str,
        factory: ActionFactory,
        attribute: Option<ActionAttribute>,
    ) {
        match attribute {
            Some(attr) => {
                self.attributes.insert(type_id.to_string(), attr);
            }
            None => {
                self.attributes.remove(type_id);
            }
        }
        self.insert(type_id, TypeKind::Action(factory));
    }

    /// Register a statically known detector type
    pub fn register_detector<T: DetectorType>(&mut self) {
        let factory: DetectorFactory =
            Arc::new(|| T::create().map(|d| Box::new(d) as Box<dyn IntrusionDetector>));
        self.register_detector_factory(T::TYPE_ID, factory);
    }

    pub fn register_detector_factory(&mut self, type_id: &str, factory: DetectorFactory) {
        self.insert(type_id, TypeKind::Detector(factory));
    }

    fn insert(&mut self, type_id: &str, kind: TypeKind) {
        let entry = TypeEntry {
            type_id: type_id.to_string(),
            kind,
        };
        match self.types.iter_mut().find(|t| t.type_id == type_id) {
            Some(existing) => *existing = entry,
            None => self.types.push(entry),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exposed types in registration order
    pub fn types(&self) -> &[TypeEntry] {
        &self.types
    }

    /// Auto-load attribute recorded for a type
    pub fn attribute(&self, type_id: &str) -> Option<ActionAttribute> {
        self.attributes.get(type_id).copied()
    }

    pub fn find(&self, type_id: &str) -> Option<&TypeEntry> {
        self.types.iter().find(|t| t.type_id == type_id)
    }
}

/// Registry of all modules known to the process
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    modules: Vec<ActionModule>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the built-in module
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_module(ActionModule::builtin());
        registry
    }

    /// Register a module, replacing any module with the same name
    pub fn register_module(&mut self, module: ActionModule) {
        info!(
            "Registering action module: {} ({} types)",
            module.name(),
            module.types().len()
        );
        match self.modules.iter_mut().find(|m| m.name == module.name) {
            Some(existing) => *existing = module,
            None => self.modules.push(module),
        }
    }

    pub fn module(&self, name: &str) -> Option<&ActionModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn modules(&self) -> &[ActionModule] {
        &self.modules
    }

    /// Resolve a type id across all modules, first registered module wins
    pub fn resolve(&self, type_id: &str) -> Option<(&ActionModule, &TypeEntry)> {
        let found = self
            .modules
            .iter()
            .find_map(|m| m.find(type_id).map(|entry| (m, entry)));
        if found.is_none() {
            debug!("Type {} not found in {} modules", type_id, self.modules.len());
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_module_contents() {
        let module = ActionModule::builtin();
        assert_eq!(module.name(), BUILTIN_MODULE);
        assert_eq!(module.types().len(), 6);
        assert_eq!(
            module.attribute(LogAction::TYPE_ID),
            Some(ActionAttribute::auto_load("log"))
        );
        assert!(module.attribute("ids_loader::actions::ActionContext").is_none());
        assert_eq!(
            module.find(ThresholdDetector::TYPE_ID).map(|t| t.kind().label()),
            Some("detector")
        );
    }

    #[test]
    fn test_reregistering_type_replaces_entry() {
        let mut module = ActionModule::new("corp");
        module.register_action_factory(
            "corp::Pager",
            Arc::new(|| -> Result<Box<dyn Action>, String> { Err("first".to_string()) }),
            Some(ActionAttribute::auto_load("page")),
        );
        module.register_action_factory(
            "corp::Pager",
            Arc::new(|| -> Result<Box<dyn Action>, String> { Ok(Box::new(LogAction)) }),
            None,
        );

        assert_eq!(module.types().len(), 1);
        assert!(module.attribute("corp::Pager").is_none());
    }

    #[test]
    fn test_resolve_across_modules() {
        let mut registry = TypeRegistry::with_builtins();
        registry.register_module(ActionModule::new("corp").with_type("corp::Helper"));

        let (module, entry) = registry.resolve("corp::Helper").unwrap();
        assert_eq!(module.name(), "corp");
        assert_eq!(entry.kind().label(), "type");
        assert!(registry.resolve(LogAction::TYPE_ID).is_some());
        assert!(registry.resolve("corp::Missing").is_none());
    }

    #[test]
    fn test_register_module_replaces_by_name() {
        let mut registry = TypeRegistry::new();
        registry.register_module(ActionModule::new("corp").with_type("corp::A"));
        registry.register_module(ActionModule::new("corp").with_type("corp::B"));

        assert_eq!(registry.modules().len(), 1);
        assert!(registry.resolve("corp::A").is_none());
        assert!(registry.resolve("corp::B").is_some());
    }
}
