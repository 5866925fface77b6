//! Intrusion detector surface used during assembly
//!
//! The loader only mutates a detector through [`IntrusionDetector::add_action`]
//! and [`IntrusionDetector::add_threshold`]. Event counting and threshold
//! evaluation belong to the runtime that receives the assembled detector.

mod threshold;

pub use threshold::{split_action_names, Threshold};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::actions::Action;

/// Detector shared with the runtime once loading completes
pub type SharedDetector = Arc<RwLock<Box<dyn IntrusionDetector>>>;

/// Mutation and read surface of an intrusion detector
pub trait IntrusionDetector: Send + Sync {
    /// Register an action, replacing any action already bound to `name`
    fn add_action(&mut self, name: &str, action: Box<dyn Action>);

    /// Register a threshold
    fn add_threshold(&mut self, threshold: Threshold);

    /// Look up an action by name
    fn action(&self, name: &str) -> Option<&dyn Action>;

    /// Registered action names, sorted
    fn action_names(&self) -> Vec<String>;

    /// Registered thresholds in registration order
    fn thresholds(&self) -> &[Threshold];
}

/// Statically registrable detector implementation
pub trait DetectorType: IntrusionDetector + Sized + 'static {
    /// Fully qualified type identifier
    const TYPE_ID: &'static str;

    /// Construct a fresh, empty detector
    fn create() -> Result<Self, String>;
}

/// Default detector: named actions plus an ordered threshold list
#[derive(Default)]
pub struct ThresholdDetector {
    actions: HashMap<String, Box<dyn Action>>,
    thresholds: Vec<Threshold>,
}

impl ThresholdDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IntrusionDetector for ThresholdDetector {
    fn add_action(&mut self, name: &str, action: Box<dyn Action>) {
        if self.actions.insert(name.to_string(), action).is_some() {
            debug!("Action {} replaced by a later registration", name);
        }
    }

    fn add_threshold(&mut self, threshold: Threshold) {
        self.thresholds.push(threshold);
    }

    fn action(&self, name: &str) -> Option<&dyn Action> {
        self.actions.get(name).map(|a| a.as_ref())
    }

    fn action_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }
}

impl DetectorType for ThresholdDetector {
    const TYPE_ID: &'static str = "ids_loader::detector::ThresholdDetector";

    fn create() -> Result<Self, String> {
        Ok(Self::new())
    }
}

impl fmt::Debug for ThresholdDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThresholdDetector")
            .field("actions", &self.action_names())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionContext, LogoutAction};
    use std::time::Duration;

    struct Failing;

    impl Action for Failing {
        fn invoke(&self, _ctx: &ActionContext) -> anyhow::Result<()> {
            anyhow::bail!("always fails")
        }
    }

    #[test]
    fn test_last_registration_wins() {
        let mut detector = ThresholdDetector::new();
        detector.add_action("respond", Box::new(Failing));
        detector.add_action("respond", Box::new(LogoutAction::default()));

        assert_eq!(detector.action_names(), vec!["respond"]);
        let ctx = ActionContext::new("csrf", 1);
        assert!(detector.action("respond").unwrap().invoke(&ctx).is_ok());
    }

    #[test]
    fn test_thresholds_keep_order() {
        let mut detector = ThresholdDetector::new();
        detector.add_threshold(Threshold::from_action_list("b", 1, Duration::from_secs(1), "log"));
        detector.add_threshold(Threshold::from_action_list("a", 2, Duration::from_secs(2), "log"));

        let names: Vec<_> = detector.thresholds().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_action() {
        let detector = ThresholdDetector::new();
        assert!(detector.action("log").is_none());
        assert!(detector.action_names().is_empty());
    }
}
