//! Wizard configuration.

/// When a step's `on_entering` hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnterPolicy {
    /// Every time the step becomes current, including through `go_back`.
    #[default]
    EveryVisit,
    /// Only the first time the step becomes current.
    FirstVisitOnly,
}

/// Configuration for a [`ModelWizard`](crate::ModelWizard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    /// Label used in log output.
    pub name: String,
    /// Re-entry policy for `on_entering`.
    pub enter_policy: EnterPolicy,
    /// Panic when navigation is driven from a thread other than the one
    /// that built the wizard.
    pub check_thread_affinity: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            name: "wizard".to_string(),
            enter_policy: EnterPolicy::default(),
            check_thread_affinity: cfg!(debug_assertions),
        }
    }
}

impl WizardConfig {
    /// Create a configuration with the given name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether `on_entering` runs on a step that has been entered before.
    pub(crate) fn reenters(&self) -> bool {
        self.enter_policy == EnterPolicy::EveryVisit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WizardConfig::default();
        assert_eq!(config.name, "wizard");
        assert_eq!(config.enter_policy, EnterPolicy::EveryVisit);
        assert_eq!(config.check_thread_affinity, cfg!(debug_assertions));
        assert!(config.reenters());
    }

    #[test]
    fn test_with_name() {
        let config = WizardConfig {
            enter_policy: EnterPolicy::FirstVisitOnly,
            ..WizardConfig::with_name("new-device")
        };
        assert_eq!(config.name, "new-device");
        assert!(!config.reenters());
    }
}
