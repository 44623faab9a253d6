//! Agent configuration types.
//!
//! `AgentSettings` represents `{data_dir}/config.toml`. Every field has a
//! default so an empty or missing file yields a working agent. Secrets are
//! deliberately absent: they come from the environment only.

use serde::{Deserialize, Serialize};

use crate::scan::{DEFAULT_FREE_SCANS, DEFAULT_TRUST_ALERT_THRESHOLD};

/// Top-level configuration for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Display name used in the system preamble and health output.
    pub agent_name: String,
    pub port: u16,
    /// `"pretty"` or `"json"`.
    pub log_format: String,
    pub claude: ClaudeSettings,
    pub memory: MemorySettings,
    pub scan: ScanSettings,
    pub squidbay: SquidBaySettings,
    pub twilio: TwilioSettings,
    /// `owner/repo` slug scanned when a request names no repository.
    pub github_repo: Option<String>,
    pub lightning_address: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            agent_name: "Unnamed Agent".to_string(),
            port: 3000,
            log_format: "pretty".to_string(),
            claude: ClaudeSettings::default(),
            memory: MemorySettings::default(),
            scan: ScanSettings::default(),
            squidbay: SquidBaySettings::default(),
            twilio: TwilioSettings::default(),
            github_repo: None,
            lightning_address: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaudeSettings {
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ClaudeSettings {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 4096,
        }
    }
}

/// Window sizes for context assembly and usage accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub same_channel_limit: u32,
    pub cross_channel_limit: u32,
    pub primary_channel: String,
    pub usage_window: u32,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            same_channel_limit: 30,
            cross_channel_limit: 10,
            primary_channel: crate::memory::PRIMARY_CHANNEL.to_string(),
            usage_window: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub free_scans: u32,
    pub alert_threshold: i64,
    pub timeout_secs: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            free_scans: DEFAULT_FREE_SCANS,
            alert_threshold: DEFAULT_TRUST_ALERT_THRESHOLD,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquidBaySettings {
    pub api_base: String,
    pub agent_id: Option<String>,
}

impl Default for SquidBaySettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.squidbay.io".to_string(),
            agent_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwilioSettings {
    pub account_sid: Option<String>,
    pub phone_number: Option<String>,
    /// Recipient of security alerts.
    pub owner_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_settings_default_values() {
        let settings = AgentSettings::default();
        assert_eq!(settings.agent_name, "Unnamed Agent");
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.claude.max_tokens, 4096);
        assert_eq!(settings.memory.same_channel_limit, 30);
        assert_eq!(settings.memory.cross_channel_limit, 10);
        assert_eq!(settings.memory.primary_channel, "chat");
        assert_eq!(settings.scan.free_scans, 10);
        assert_eq!(settings.scan.alert_threshold, 80);
    }

    #[test]
    fn test_agent_settings_deserialize_empty() {
        let settings: AgentSettings = toml::from_str("").unwrap();
        assert_eq!(settings, AgentSettings::default());
    }

    #[test]
    fn test_agent_settings_deserialize_partial() {
        let toml_str = r#"
agent_name = "Inky"
github_repo = "octo/inky"

[claude]
max_tokens = 1024

[scan]
free_scans = 3
"#;
        let settings: AgentSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.agent_name, "Inky");
        assert_eq!(settings.github_repo.as_deref(), Some("octo/inky"));
        assert_eq!(settings.claude.max_tokens, 1024);
        assert_eq!(settings.claude.model, "claude-sonnet-4-5-20250929");
        assert_eq!(settings.scan.free_scans, 3);
        assert_eq!(settings.scan.alert_threshold, 80);
    }
}
