//! Workflow configuration.

use serde::Deserialize;

/// Configuration for the workflow service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// How many times a sign/revert/toggle is re-run against fresh state
    /// after a version conflict before the conflict is surfaced
    /// (default: 3).
    pub max_conflict_retries: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retries() {
        assert_eq!(WorkflowConfig::default().max_conflict_retries, 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: WorkflowConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_conflict_retries, 3);

        let config: WorkflowConfig =
            serde_json::from_str(r#"{ "max_conflict_retries": 0 }"#).unwrap();
        assert_eq!(config.max_conflict_retries, 0);
    }
}
