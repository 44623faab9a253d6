//! Agent configuration loader.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`AgentSettings`], falling back to defaults when the file is missing or
//! malformed. Environment variables then override individual fields. Secrets
//! are only ever read from the environment.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use serde::Serialize;
use squid_types::config::AgentSettings;

/// Name of the settings file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Credentials for outbound services, never written to disk or logged.
#[derive(Default)]
pub struct Secrets {
    pub anthropic_api_key: Option<SecretString>,
    pub squidbay_api_key: Option<SecretString>,
    pub twilio_auth_token: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = |key: &str| lookup(key).map(SecretString::from);
        Self {
            anthropic_api_key: secret("ANTHROPIC_API_KEY"),
            squidbay_api_key: secret("SQUIDBAY_API_KEY"),
            twilio_auth_token: secret("TWILIO_AUTH_TOKEN"),
        }
    }
}

/// Which outward channels have credentials configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub sms: bool,
    pub x: bool,
    pub moltbook: bool,
    pub squidbay: bool,
}

impl ChannelStatus {
    pub fn detect(settings: &AgentSettings, secrets: &Secrets) -> Self {
        Self::detect_with(settings, secrets, env_lookup)
    }

    fn detect_with(
        settings: &AgentSettings,
        secrets: &Secrets,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let has = |key: &str| lookup(key).is_some();
        Self {
            sms: settings.twilio.account_sid.is_some()
                && settings.twilio.phone_number.is_some()
                && secrets.twilio_auth_token.is_some(),
            x: ["X_API_KEY", "X_API_SECRET", "X_ACCESS_TOKEN", "X_ACCESS_SECRET"]
                .iter()
                .all(|key| has(*key)),
            moltbook: has("MOLTBOOK_API_KEY"),
            squidbay: settings.squidbay.agent_id.is_some(),
        }
    }
}

/// Non-empty environment value.
fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the data directory.
///
/// Priority: `SQUID_DATA_DIR`, then `RAILWAY_VOLUME_MOUNT_PATH` (mounted
/// volumes on Railway), then `./data`.
pub fn resolve_data_dir() -> PathBuf {
    resolve_data_dir_with(env_lookup)
}

fn resolve_data_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    lookup("SQUID_DATA_DIR")
        .or_else(|| lookup("RAILWAY_VOLUME_MOUNT_PATH"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Load settings from `{data_dir}/config.toml`, then apply environment
/// overrides.
///
/// - Missing file: defaults.
/// - Unreadable or malformed file: a warning, then defaults.
pub async fn load_settings(data_dir: &Path) -> AgentSettings {
    let mut settings = load_settings_file(data_dir).await;
    apply_env_overrides(&mut settings, env_lookup);
    settings
}

async fn load_settings_file(data_dir: &Path) -> AgentSettings {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AgentSettings::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AgentSettings::default();
        }
    };

    match toml::from_str::<AgentSettings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AgentSettings::default()
        }
    }
}

fn parse_or_keep<T: FromStr + Copy>(key: &str, raw: Option<String>, current: T) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring {key}={raw}: not a valid number");
            current
        }),
        None => current,
    }
}

fn apply_env_overrides(settings: &mut AgentSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(name) = lookup("AGENT_NAME") {
        settings.agent_name = name;
    }
    settings.port = parse_or_keep("PORT", lookup("PORT"), settings.port);
    if let Some(format) = lookup("LOG_FORMAT") {
        settings.log_format = format;
    }

    if let Some(model) = lookup("CLAUDE_MODEL") {
        settings.claude.model = model;
    }
    settings.claude.max_tokens = parse_or_keep(
        "CLAUDE_MAX_TOKENS",
        lookup("CLAUDE_MAX_TOKENS"),
        settings.claude.max_tokens,
    );

    if let Some(api_base) = lookup("SQUIDBAY_API_BASE") {
        settings.squidbay.api_base = api_base;
    }
    if let Some(agent_id) = lookup("SQUIDBAY_AGENT_ID") {
        settings.squidbay.agent_id = Some(agent_id);
    }

    if let Some(sid) = lookup("TWILIO_ACCOUNT_SID") {
        settings.twilio.account_sid = Some(sid);
    }
    if let Some(number) = lookup("TWILIO_PHONE_NUMBER") {
        settings.twilio.phone_number = Some(number);
    }
    if let Some(owner) = lookup("OWNER_PHONE_NUMBER") {
        settings.twilio.owner_phone = Some(owner);
    }

    if let Some(repo) = lookup("GITHUB_REPO") {
        settings.github_repo = Some(repo);
    }
    if let Some(address) = lookup("LIGHTNING_ADDRESS") {
        settings.lightning_address = Some(address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn load_settings_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let settings = load_settings_file(tmp.path()).await;
        assert_eq!(settings, AgentSettings::default());
    }

    #[tokio::test]
    async fn load_settings_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
agent_name = "Inky"

[memory]
same_channel_limit = 12

[scan]
free_scans = 3
"#,
        )
        .await
        .unwrap();

        let settings = load_settings_file(tmp.path()).await;
        assert_eq!(settings.agent_name, "Inky");
        assert_eq!(settings.memory.same_channel_limit, 12);
        assert_eq!(settings.memory.cross_channel_limit, 10);
        assert_eq!(settings.scan.free_scans, 3);
    }

    #[tokio::test]
    async fn load_settings_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let settings = load_settings_file(tmp.path()).await;
        assert_eq!(settings, AgentSettings::default());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut settings = AgentSettings::default();
        apply_env_overrides(
            &mut settings,
            lookup_from(&[
                ("AGENT_NAME", "Squiddy"),
                ("PORT", "8080"),
                ("CLAUDE_MAX_TOKENS", "1024"),
                ("SQUIDBAY_AGENT_ID", "agent_7"),
                ("GITHUB_REPO", "https://github.com/acme/agent"),
                ("OWNER_PHONE_NUMBER", "+15550001111"),
            ]),
        );

        assert_eq!(settings.agent_name, "Squiddy");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.claude.max_tokens, 1024);
        assert_eq!(settings.squidbay.agent_id.as_deref(), Some("agent_7"));
        assert_eq!(
            settings.github_repo.as_deref(),
            Some("https://github.com/acme/agent")
        );
        assert_eq!(settings.twilio.owner_phone.as_deref(), Some("+15550001111"));
    }

    #[test]
    fn invalid_numeric_override_is_ignored() {
        let mut settings = AgentSettings::default();
        apply_env_overrides(&mut settings, lookup_from(&[("PORT", "eighty")]));
        assert_eq!(settings.port, 3000);
    }

    #[test]
    fn data_dir_priority() {
        assert_eq!(
            resolve_data_dir_with(lookup_from(&[
                ("SQUID_DATA_DIR", "/srv/squid"),
                ("RAILWAY_VOLUME_MOUNT_PATH", "/app/data"),
            ])),
            PathBuf::from("/srv/squid")
        );
        assert_eq!(
            resolve_data_dir_with(lookup_from(&[("RAILWAY_VOLUME_MOUNT_PATH", "/app/data")])),
            PathBuf::from("/app/data")
        );
        assert_eq!(resolve_data_dir_with(lookup_from(&[])), PathBuf::from("./data"));
    }

    #[test]
    fn channel_status_requires_complete_credentials() {
        let mut settings = AgentSettings::default();
        settings.twilio.account_sid = Some("AC1".into());
        settings.twilio.phone_number = Some("+15550001111".into());
        settings.squidbay.agent_id = Some("agent_1".into());
        let secrets = Secrets::from_lookup(lookup_from(&[("TWILIO_AUTH_TOKEN", "tok")]));

        let status = ChannelStatus::detect_with(
            &settings,
            &secrets,
            lookup_from(&[("X_API_KEY", "k"), ("MOLTBOOK_API_KEY", "m")]),
        );
        assert_eq!(
            status,
            ChannelStatus {
                sms: true,
                x: false,
                moltbook: true,
                squidbay: true,
            }
        );
    }

    #[test]
    fn secrets_come_from_lookup() {
        let secrets = Secrets::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-test")]));
        assert_eq!(
            secrets.anthropic_api_key.as_ref().map(|k| k.expose_secret()),
            Some("sk-test")
        );
        assert!(secrets.squidbay_api_key.is_none());
        assert!(secrets.twilio_auth_token.is_none());
    }
}
