use tracing::{debug, trace};

use super::instantiate::instantiate_entry;
use crate::detector::IntrusionDetector;
use crate::error::InstantiationError;
use crate::plugin::{ActionModule, TypeKind};
use crate::wildcard::WildcardPattern;

/// Auto-load every matching, auto-load-eligible action of `module`.
///
/// Returns the number of actions registered. Stops at the first eligible type
/// that fails to construct; actions registered before it stay registered.
pub fn scan(
    detector: &mut dyn IntrusionDetector,
    module: &ActionModule,
    pattern: &WildcardPattern,
) -> Result<usize, InstantiationError> {
    let mut loaded = 0;

    for entry in module.types() {
        if !pattern.is_match(entry.type_id()) {
            continue;
        }
        if !matches!(entry.kind(), TypeKind::Action(_)) {
            trace!("Skipping {}: not an action", entry.type_id());
            continue;
        }
        let eligible = module
            .attribute(entry.type_id())
            .map(|attr| attr.auto_load)
            .unwrap_or(false);
        if !eligible {
            trace!("Skipping {}: not marked for auto-load", entry.type_id());
            continue;
        }

        let annotated = instantiate_entry(module, entry)?;
        debug!("Auto-loaded action {} ({})", annotated.name, entry.type_id());
        detector.add_action(&annotated.name, annotated.action);
        loaded += 1;
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, ActionAttribute, LogAction};
    use crate::detector::ThresholdDetector;
    use crate::plugin::BUILTIN_ACTIONS;
    use std::sync::Arc;

    fn ok_factory() -> crate::plugin::ActionFactory {
        Arc::new(|| -> Result<Box<dyn Action>, String> { Ok(Box::new(LogAction)) })
    }

    #[test]
    fn test_scan_builtins() {
        let mut detector = ThresholdDetector::new();
        let pattern = WildcardPattern::compile(BUILTIN_ACTIONS).unwrap();

        let loaded = scan(&mut detector, &ActionModule::builtin(), &pattern).unwrap();
        assert_eq!(loaded, 4);
        assert_eq!(detector.action_names(), vec!["block", "lock", "log", "logout"]);
    }

    #[test]
    fn test_scan_respects_pattern() {
        let mut detector = ThresholdDetector::new();
        let pattern = WildcardPattern::compile("ids_loader::actions::Lo?Action").unwrap();

        scan(&mut detector, &ActionModule::builtin(), &pattern).unwrap();
        assert_eq!(detector.action_names(), vec!["log"]);
    }

    #[test]
    fn test_scan_skips_ineligible_types() {
        let mut module = ActionModule::new("corp").with_type("corp::Helper");
        module.register_action_factory(
            "corp::Manual",
            ok_factory(),
            Some(ActionAttribute::named("manual")),
        );
        module.register_action_factory("corp::Bare", ok_factory(), None);
        module.register_action_factory(
            "corp::Auto",
            ok_factory(),
            Some(ActionAttribute::auto_load("auto")),
        );

        let mut detector = ThresholdDetector::new();
        let pattern = WildcardPattern::compile("corp::*").unwrap();
        assert_eq!(scan(&mut detector, &module, &pattern).unwrap(), 1);
        assert_eq!(detector.action_names(), vec!["auto"]);
    }

    #[test]
    fn test_scan_stops_at_failing_type() {
        let mut module = ActionModule::new("corp");
        module.register_action_factory(
            "corp::First",
            ok_factory(),
            Some(ActionAttribute::auto_load("first")),
        );
        module.register_action_factory(
            "corp::Broken",
            Arc::new(|| -> Result<Box<dyn Action>, String> { Err("broken".to_string()) }),
            Some(ActionAttribute::auto_load("broken")),
        );
        module.register_action_factory(
            "corp::Last",
            ok_factory(),
            Some(ActionAttribute::auto_load("last")),
        );

        let mut detector = ThresholdDetector::new();
        let pattern = WildcardPattern::compile("corp::*").unwrap();
        let err = scan(&mut detector, &module, &pattern).unwrap_err();

        assert!(matches!(err, InstantiationError::ConstructionFailed { .. }));
        assert_eq!(detector.action_names(), vec!["first"]);
    }

    #[test]
    fn test_broken_type_outside_pattern_is_ignored() {
        let mut module = ActionModule::new("corp");
        module.register_action_factory(
            "corp::internal::Broken",
            Arc::new(|| -> Result<Box<dyn Action>, String> { Err("broken".to_string()) }),
            Some(ActionAttribute::auto_load("broken")),
        );
        module.register_action_factory(
            "corp::public::Ok",
            ok_factory(),
            Some(ActionAttribute::auto_load("ok")),
        );

        let mut detector = ThresholdDetector::new();
        let pattern = WildcardPattern::compile("corp::public::*").unwrap();
        assert_eq!(scan(&mut detector, &module, &pattern).unwrap(), 1);
    }
}
