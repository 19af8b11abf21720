use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::models::MatchSettings;
use crate::services::TwilioCredentials;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub matching: MatchSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Database connection; without a URL the service keeps data in memory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    /// JSON array of donors loaded into the in-memory store at startup
    pub seed_donors_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhatsAppMode {
    Log,
    Twilio,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_whatsapp_mode")]
    pub whatsapp_mode: WhatsAppMode,
    pub twilio: Option<TwilioSettings>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            whatsapp_mode: default_whatsapp_mode(),
            twilio: None,
        }
    }
}

fn default_whatsapp_mode() -> WhatsAppMode { WhatsAppMode::Log }

/// Twilio account; any field may be absent until delivery is switched on
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioSettings {
    #[serde(default = "default_twilio_api_base")]
    pub api_base: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
}

fn default_twilio_api_base() -> String { "https://api.twilio.com".to_string() }

impl TwilioSettings {
    /// Credentials when the account sid, token and sender are all set
    pub fn credentials(&self) -> Option<TwilioCredentials> {
        Some(TwilioCredentials {
            api_base: self.api_base.clone(),
            account_sid: self.account_sid.clone()?,
            auth_token: self.auth_token.clone()?,
            from_number: self.from_number.clone()?,
        })
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with BLOODLINK__)
    /// 5. Well-known variables: DATABASE_URL, BLOODLINK_JWT_SECRET, TWILIO_*
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., BLOODLINK__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("BLOODLINK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings, |key| std::env::var(key).ok())?.try_deserialize()
    }
}

/// Apply the conventional environment variables on top of loaded settings
fn apply_env_overrides<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let overrides = [
        ("DATABASE_URL", "database.url"),
        ("BLOODLINK_JWT_SECRET", "auth.jwt_secret"),
        ("TWILIO_ACCOUNT_SID", "notifications.twilio.account_sid"),
        ("TWILIO_AUTH_TOKEN", "notifications.twilio.auth_token"),
        ("TWILIO_WHATSAPP_NUMBER", "notifications.twilio.from_number"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Some(value) = lookup(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const BASE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8000

        [auth]
        jwt_secret = "file-secret"
    "#;

    fn base_config() -> Config {
        Config::builder()
            .add_source(File::from_str(BASE, FileFormat::Toml))
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let settings: Settings = base_config().try_deserialize().unwrap();

        assert!(settings.database.url.is_none());
        assert_eq!(settings.matching, MatchSettings::default());
        assert_eq!(settings.notifications.whatsapp_mode, WhatsAppMode::Log);
        assert!(settings.notifications.twilio.is_none());
    }

    #[test]
    fn test_matching_overrides() {
        let config = Config::builder()
            .add_source(File::from_str(BASE, FileFormat::Toml))
            .add_source(File::from_str("[matching]\nmax_radius_km = 75.5\n", FileFormat::Toml))
            .build()
            .unwrap();
        let settings: Settings = config.try_deserialize().unwrap();

        assert_eq!(settings.matching.max_radius_km, 75.5);
        assert_eq!(settings.matching.max_results, 10);
    }

    #[test]
    fn test_env_overrides() {
        let lookup = |key: &str| match key {
            "DATABASE_URL" => Some("postgres://db/bloodlink".to_string()),
            "BLOODLINK_JWT_SECRET" => Some("env-secret".to_string()),
            "TWILIO_ACCOUNT_SID" => Some("AC1".to_string()),
            "TWILIO_AUTH_TOKEN" => Some("tok".to_string()),
            "TWILIO_WHATSAPP_NUMBER" => Some("+14155238886".to_string()),
            _ => None,
        };

        let settings: Settings = apply_env_overrides(base_config(), lookup)
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.database.url.as_deref(), Some("postgres://db/bloodlink"));
        assert_eq!(settings.auth.jwt_secret, "env-secret");
        let credentials = settings.notifications.twilio.unwrap().credentials().unwrap();
        assert_eq!(credentials.account_sid, "AC1");
        assert_eq!(credentials.from_number, "+14155238886");
        assert_eq!(credentials.api_base, "https://api.twilio.com");
    }

    #[test]
    fn test_partial_twilio_env_still_loads() {
        let lookup = |key: &str| (key == "TWILIO_ACCOUNT_SID").then(|| "AC1".to_string());

        let settings: Settings = apply_env_overrides(base_config(), lookup)
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.notifications.whatsapp_mode, WhatsAppMode::Log);
        let twilio = settings.notifications.twilio.unwrap();
        assert_eq!(twilio.account_sid.as_deref(), Some("AC1"));
        assert!(twilio.auth_token.is_none());
        assert!(twilio.credentials().is_none());
    }
}
