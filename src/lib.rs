//! Intrusion detector assembly
//!
//! Builds an intrusion detector from configuration: discovers auto-load
//! actions in registered modules, wires explicitly configured actions by name
//! and registers event thresholds.
//!
//! ```ignore
//! use ids_loader::{config::Config, loader, plugin::TypeRegistry};
//!
//! let config = Config::load("config.toml")?;
//! let registry = TypeRegistry::with_builtins();
//! let report = loader::load(&registry, &config.intrusion_detector)?;
//! for fault in report.faults() {
//!     eprintln!("skipped: {fault}");
//! }
//! let detector = report.into_shared();
//! ```

pub mod actions;
pub mod config;
pub mod detector;
pub mod error;
pub mod loader;
pub mod plugin;
pub mod wildcard;

pub use actions::{Action, ActionAttribute, ActionContext, ActionType};
pub use config::{Config, DetectorConfig};
pub use detector::{IntrusionDetector, SharedDetector, Threshold, ThresholdDetector};
pub use error::{InstantiationError, LoadError, ModuleError, PatternError};
pub use loader::{DetectorLoader, LoadLogger, LoadReport, TracingLogger};
pub use plugin::{ActionModule, TypeRegistry};
pub use wildcard::WildcardPattern;
