use serde::Deserialize;

/// Pref gating measurement submission.
pub const PREF_SUBMISSION_ENABLED: &str =
    "dom.private-attribution.submission.enabled";

/// Pref reflecting the user's data upload choice.
pub const PREF_TELEMETRY_UPLOAD_ENABLED: &str =
    "datareporting.healthreport.uploadEnabled";

pub const PREF_DAP_LEADER: &str = "toolkit.telemetry.dap_leader";
pub const PREF_DAP_HELPER: &str = "toolkit.telemetry.dap_helper";

/// Number of conversions a single impression may be attributed to.
pub const MAX_CONVERSIONS: u32 = 2;

/// Settings consumed from the embedding environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Conversion budget given to every new impression record.
    pub max_conversions: u32,

    pub submission_enabled: bool,
    pub telemetry_upload_enabled: bool,

    /// Whether telemetry reporting was compiled into this build.
    pub telemetry_reporting_built: bool,

    /// Turns the engine on regardless of the switches above.
    pub test_force_enabled: bool,

    /// Aggregation endpoints. Only the aggregation client reads these.
    pub dap_leader: Option<String>,
    pub dap_helper: Option<String>,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            max_conversions: MAX_CONVERSIONS,
            submission_enabled: true,
            telemetry_upload_enabled: true,
            telemetry_reporting_built: true,
            test_force_enabled: false,
            dap_leader: None,
            dap_helper: None,
        }
    }
}

impl AttributionConfig {
    pub fn is_enabled(&self) -> bool {
        self.test_force_enabled
            || (self.telemetry_upload_enabled
                && self.telemetry_reporting_built
                && self.submission_enabled)
    }

    /// Reads the boolean and string prefs through `lookup`, keeping defaults
    /// for prefs the host does not report.
    pub fn from_prefs(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let flag = |name: &str, default: bool| {
            lookup(name)
                .and_then(|value| value.parse::<bool>().ok())
                .unwrap_or(default)
        };

        config.submission_enabled =
            flag(PREF_SUBMISSION_ENABLED, config.submission_enabled);
        config.telemetry_upload_enabled =
            flag(PREF_TELEMETRY_UPLOAD_ENABLED, config.telemetry_upload_enabled);
        config.dap_leader = lookup(PREF_DAP_LEADER);
        config.dap_helper = lookup(PREF_DAP_HELPER);
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_is_enabled() {
        let config = AttributionConfig::default();
        assert!(config.is_enabled());

        let config = AttributionConfig {
            submission_enabled: false,
            ..Default::default()
        };
        assert!(!config.is_enabled());

        let config = AttributionConfig {
            telemetry_reporting_built: false,
            ..Default::default()
        };
        assert!(!config.is_enabled());

        let config = AttributionConfig {
            submission_enabled: false,
            telemetry_upload_enabled: false,
            test_force_enabled: true,
            ..Default::default()
        };
        assert!(config.is_enabled());
    }

    #[test]
    fn test_from_prefs() {
        let prefs = HashMap::from([
            (PREF_SUBMISSION_ENABLED, "false".to_string()),
            (PREF_TELEMETRY_UPLOAD_ENABLED, "not a bool".to_string()),
            (PREF_DAP_LEADER, "https://leader.example".to_string()),
        ]);
        let config =
            AttributionConfig::from_prefs(|name| prefs.get(name).cloned());

        assert!(!config.submission_enabled);
        // unparsable values keep the default
        assert!(config.telemetry_upload_enabled);
        assert_eq!(config.dap_leader.as_deref(), Some("https://leader.example"));
        assert_eq!(config.dap_helper, None);
        assert_eq!(config.max_conversions, MAX_CONVERSIONS);
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_deserialize_with_defaults() -> Result<(), anyhow::Error> {
        let config: AttributionConfig = serde_json::from_str(
            r#"{"max_conversions": 5, "dap_helper": "https://helper.example"}"#,
        )?;
        assert_eq!(config.max_conversions, 5);
        assert_eq!(config.dap_helper.as_deref(), Some("https://helper.example"));
        assert!(config.submission_enabled);
        assert!(!config.test_force_enabled);
        Ok(())
    }
}
