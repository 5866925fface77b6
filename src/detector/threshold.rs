use std::time::Duration;

use serde::Serialize;

/// Event threshold: `count` occurrences of `name` within `interval` fire `actions`.
///
/// Action names are references into the detector's action map and are not
/// resolved when the threshold is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Threshold {
    name: String,
    count: u32,
    interval: Duration,
    actions: Vec<String>,
}

impl Threshold {
    pub fn new(name: &str, count: u32, interval: Duration, actions: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            count,
            interval,
            actions,
        }
    }

    /// Build from a comma-separated action list
    pub fn from_action_list(name: &str, count: u32, interval: Duration, actions: &str) -> Self {
        Self::new(name, count, interval, split_action_names(actions))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }
}

/// Split a comma-separated list of action names, dropping empty entries
pub fn split_action_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_order() {
        assert_eq!(split_action_names("logAction,lockAction"), vec!["logAction", "lockAction"]);
        assert_eq!(split_action_names("b, a ,c"), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_split_drops_empty_entries() {
        assert!(split_action_names("").is_empty());
        assert!(split_action_names(",,,").is_empty());
        assert!(split_action_names(" , ,").is_empty());
        assert_eq!(split_action_names(",log,,block,"), vec!["log", "block"]);
    }

    #[test]
    fn test_from_action_list() {
        let threshold =
            Threshold::from_action_list("login_fail", 5, Duration::from_secs(60), "log,lock");
        assert_eq!(threshold.name(), "login_fail");
        assert_eq!(threshold.count(), 5);
        assert_eq!(threshold.interval(), Duration::from_secs(60));
        assert_eq!(threshold.actions(), ["log", "lock"]);
    }
}
