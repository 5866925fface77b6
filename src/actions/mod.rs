//! Intrusion response actions
//!
//! An action is invoked by the detector runtime when a threshold fires.
//! Action types are registered in an [`ActionModule`](crate::plugin::ActionModule)
//! together with an optional [`ActionAttribute`] that makes them eligible for
//! auto-loading.

pub mod builtin;

pub use builtin::{BlockAction, LockAction, LogAction, LogoutAction};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Invocation payload handed to an action when a threshold fires
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionContext {
    /// Event name of the threshold that fired
    pub event: String,
    /// User, session or address the events were attributed to
    pub principal: Option<String>,
    /// Number of events observed within the interval
    pub count: u32,
    /// When the threshold fired
    pub timestamp: DateTime<Utc>,
}

impl ActionContext {
    pub fn new(event: &str, count: u32) -> Self {
        Self {
            event: event.to_string(),
            principal: None,
            count,
            timestamp: Utc::now(),
        }
    }

    pub fn with_principal(mut self, principal: &str) -> Self {
        self.principal = Some(principal.to_string());
        self
    }
}

/// Response behavior invoked on a detected condition
pub trait Action: Send + Sync {
    /// Run the action
    fn invoke(&self, ctx: &ActionContext) -> anyhow::Result<()>;
}

/// Auto-load registration attached to an action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionAttribute {
    /// Register the action without explicit configuration
    pub auto_load: bool,
    /// Name the action is registered under when auto-loaded
    pub name: &'static str,
}

impl ActionAttribute {
    pub const fn auto_load(name: &'static str) -> Self {
        Self {
            auto_load: true,
            name,
        }
    }

    pub const fn named(name: &'static str) -> Self {
        Self {
            auto_load: false,
            name,
        }
    }
}

/// Statically registrable action type with a parameterless constructor
pub trait ActionType: Action + Sized + 'static {
    /// Fully qualified type identifier
    const TYPE_ID: &'static str;

    /// Auto-load registration, if any
    const REGISTRATION: Option<ActionAttribute> = None;

    /// Construct a fresh instance
    fn create() -> Result<Self, String>;
}
