//! Intrusion detector assembly
//!
//! [`DetectorLoader::load`] runs once, synchronously, over a parsed
//! [`DetectorConfig`]:
//!
//! 1. construct the configured detector type, or the built-in
//!    [`ThresholdDetector`] when none is set
//! 2. with the built-in detector, auto-load the built-in actions
//! 3. scan every configured module for auto-load actions
//! 4. register explicitly configured actions by name
//! 5. register thresholds
//!
//! Failing to construct an explicitly configured detector is the only error
//! returned. Module and action failures are logged through the injected
//! [`LoadLogger`] and collected in the [`LoadReport`]; the failing unit is
//! left out and loading continues.

mod instantiate;
mod logger;
mod scan;

pub use instantiate::{instantiate, instantiate_annotated, instantiate_detector, Annotated};
pub use logger::{LoadLogger, TracingLogger};
pub use scan::scan;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, Level};

use crate::config::{ActionEntry, DetectorConfig, ModuleRef, ThresholdConfig};
use crate::detector::{IntrusionDetector, SharedDetector, Threshold, ThresholdDetector};
use crate::error::{LoadError, ModuleError};
use crate::plugin::{TypeRegistry, BUILTIN_ACTIONS, BUILTIN_MODULE};
use crate::wildcard::WildcardPattern;

/// Assembled detector plus the faults isolated while building it
pub struct LoadReport {
    detector: Box<dyn IntrusionDetector>,
    faults: Vec<LoadError>,
}

impl LoadReport {
    pub fn detector(&self) -> &dyn IntrusionDetector {
        self.detector.as_ref()
    }

    /// Non-fatal faults in the order they occurred
    pub fn faults(&self) -> &[LoadError] {
        &self.faults
    }

    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    /// `(threshold, action)` pairs naming an action that is not registered
    pub fn dangling_references(&self) -> Vec<(String, String)> {
        self.detector
            .thresholds()
            .iter()
            .flat_map(|t| {
                t.actions()
                    .iter()
                    .filter(|name| self.detector.action(name).is_none())
                    .map(|name| (t.name().to_string(), name.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn into_detector(self) -> Box<dyn IntrusionDetector> {
        self.detector
    }

    /// Hand the detector over for shared read-mostly use
    pub fn into_shared(self) -> SharedDetector {
        Arc::new(RwLock::new(self.detector))
    }
}

impl fmt::Debug for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadReport")
            .field("actions", &self.detector.action_names())
            .field("thresholds", &self.detector.thresholds())
            .field("faults", &self.faults)
            .finish()
    }
}

/// Builds intrusion detectors from configuration
pub struct DetectorLoader<'a> {
    registry: &'a TypeRegistry,
    logger: &'a dyn LoadLogger,
}

impl<'a> DetectorLoader<'a> {
    pub fn new(registry: &'a TypeRegistry, logger: &'a dyn LoadLogger) -> Self {
        Self { registry, logger }
    }

    /// Assemble a detector from `config`
    pub fn load(&self, config: &DetectorConfig) -> Result<LoadReport, LoadError> {
        let mut faults = Vec::new();

        let mut detector = match config.explicit_type() {
            Some(type_id) => {
                let detector = instantiate_detector(self.registry, type_id).map_err(|source| {
                    LoadError::DetectorResolution {
                        type_id: type_id.to_string(),
                        source,
                    }
                })?;
                info!("Using intrusion detector {}", type_id);
                detector
            }
            None => {
                let mut detector: Box<dyn IntrusionDetector> = Box::new(ThresholdDetector::new());
                let builtin = ModuleRef::new(BUILTIN_MODULE, BUILTIN_ACTIONS);
                if let Err(source) = self.load_module(detector.as_mut(), &builtin) {
                    self.isolate(
                        LoadError::ModuleLoad {
                            module: builtin.name,
                            source,
                        },
                        &mut faults,
                    );
                }
                detector
            }
        };

        for module in &config.actions.modules {
            if let Err(source) = self.load_module(detector.as_mut(), module) {
                self.isolate(
                    LoadError::ModuleLoad {
                        module: module.name.clone(),
                        source,
                    },
                    &mut faults,
                );
            }
        }

        for entry in &config.actions.actions {
            if let Err(fault) = self.load_action(detector.as_mut(), entry) {
                self.isolate(fault, &mut faults);
            }
        }

        for threshold in &config.event_thresholds {
            detector.add_threshold(build_threshold(threshold));
        }

        info!(
            "Intrusion detector loaded: {} actions, {} thresholds, {} faults",
            detector.action_names().len(),
            detector.thresholds().len(),
            faults.len()
        );

        Ok(LoadReport { detector, faults })
    }

    fn load_module(
        &self,
        detector: &mut dyn IntrusionDetector,
        module_ref: &ModuleRef,
    ) -> Result<usize, ModuleError> {
        let module = self
            .registry
            .module(&module_ref.name)
            .ok_or_else(|| ModuleError::NotFound(module_ref.name.clone()))?;
        let pattern = WildcardPattern::compile(&module_ref.types)?;

        let loaded = scan(detector, module, &pattern)?;
        debug!(
            "Loaded {} actions from module {} ({})",
            loaded,
            module_ref.name,
            pattern.as_str()
        );
        Ok(loaded)
    }

    fn load_action(
        &self,
        detector: &mut dyn IntrusionDetector,
        entry: &ActionEntry,
    ) -> Result<(), LoadError> {
        let action = instantiate(self.registry, &entry.action_type).map_err(|source| {
            LoadError::ActionInstantiation {
                name: entry.name.clone(),
                source,
            }
        })?;

        debug!("Loaded action {} ({})", entry.name, entry.action_type);
        detector.add_action(&entry.name, action);
        Ok(())
    }

    fn isolate(&self, fault: LoadError, faults: &mut Vec<LoadError>) {
        let message = fault.to_string();
        let cause = std::error::Error::source(&fault).unwrap_or(&fault);
        self.logger.warning(Level::WARN, &message, cause);
        faults.push(fault);
    }
}

/// Assemble a detector logging isolated faults through `tracing`
pub fn load(registry: &TypeRegistry, config: &DetectorConfig) -> Result<LoadReport, LoadError> {
    DetectorLoader::new(registry, &TracingLogger).load(config)
}

fn build_threshold(config: &ThresholdConfig) -> Threshold {
    Threshold::from_action_list(&config.name, config.count, config.interval(), &config.actions)
}
