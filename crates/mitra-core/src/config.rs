use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Linking codes expire 10 minutes after issue.
pub const LINK_CODE_TTL_SECS: i64 = 600;
/// Length of a linking code.
pub const LINK_CODE_LEN: usize = 6;

/// Outbound call timeouts. Timeouts are treated like any other transport
/// failure — there are no retries in the core.
pub const TELEGRAM_TIMEOUT_SECS: u64 = 15;
pub const GEMINI_TIMEOUT_SECS: u64 = 30;

/// Top-level config (mitra.toml + MITRA_* env overrides).
///
/// Env keys nest with a double underscore so two-word field names survive:
/// `MITRA_GEMINI__API_KEY` → `gemini.api_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MitraConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub linking: LinkingConfig,
}

impl Default for MitraConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            telegram: TelegramConfig::default(),
            gemini: GeminiConfig::default(),
            linking: LinkingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. When unset the sender fails with `Unconfigured`
    /// instead of attempting a network call.
    pub bot_token: Option<String>,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Shared secret checked against X-Telegram-Bot-Api-Secret-Token on
    /// inbound webhook requests. Unset means no check.
    pub webhook_secret: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: default_telegram_api_base(),
            webhook_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Generative-language API key. When unset the advisor short-circuits
    /// to a configuration-needed reply with zero network calls.
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkingConfig {
    #[serde(default = "default_link_ttl_secs")]
    pub ttl_secs: i64,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            ttl_secs: LINK_CODE_TTL_SECS,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}
fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}
fn default_link_ttl_secs() -> i64 {
    LINK_CODE_TTL_SECS
}

impl MitraConfig {
    /// Load config from a TOML file with MITRA_* env var overrides
    /// (section and field separated by `__`, e.g. `MITRA_TELEGRAM__BOT_TOKEN`).
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ./mitra.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or("mitra.toml");

        let config: MitraConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MITRA_").split("__"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unconfigured() {
        let cfg = MitraConfig::default();
        assert!(cfg.telegram.bot_token.is_none());
        assert!(cfg.gemini.api_key.is_none());
        assert_eq!(cfg.linking.ttl_secs, LINK_CODE_TTL_SECS);
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = MitraConfig::load(Some("/nonexistent/mitra.toml")).expect("load");
        assert_eq!(cfg.telegram.api_base, "https://api.telegram.org");
        assert_eq!(cfg.gemini.model, "gemini-2.0-flash");
    }

    #[test]
    fn env_overrides_reach_two_word_fields() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MITRA_GEMINI__API_KEY", "k-from-env");
            jail.set_env("MITRA_TELEGRAM__BOT_TOKEN", "t-from-env");
            jail.set_env("MITRA_LINKING__TTL_SECS", "120");

            let cfg = MitraConfig::load(None).expect("load");
            assert_eq!(cfg.gemini.api_key.as_deref(), Some("k-from-env"));
            assert_eq!(cfg.telegram.bot_token.as_deref(), Some("t-from-env"));
            assert_eq!(cfg.linking.ttl_secs, 120);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml_value() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "mitra.toml",
                r#"
                [gemini]
                api_key = "k-from-file"
                "#,
            )?;
            jail.set_env("MITRA_GEMINI__API_KEY", "k-from-env");

            let cfg = MitraConfig::load(None).expect("load");
            assert_eq!(cfg.gemini.api_key.as_deref(), Some("k-from-env"));
            Ok(())
        });
    }
}
