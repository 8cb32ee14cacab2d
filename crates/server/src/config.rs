use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// Settings for the bulk alert subsystem.
#[derive(Clone, Debug, Deserialize)]
pub struct AlertsConfig {
    /// Brand shown in the sender name, default subject and email body.
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
    /// PNG attached inline to every alert email as `image/png`. Must have a `.png` extension
    /// and PNG content. Read once at startup.
    #[serde(default)]
    pub logo_path: Option<String>,
    /// Upper bound on in-flight sends within one batch. `1` keeps dispatch strictly sequential,
    /// which consumer SMTP providers (e.g. Gmail) need to avoid throttling.
    #[serde(default = "default_max_concurrent_sends")]
    pub max_concurrent_sends: usize,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            brand_name: default_brand_name(),
            logo_path: None,
            max_concurrent_sends: default_max_concurrent_sends(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// HS256 secret shared with the auth service that issues bearer tokens.
    pub jwt_secret: String,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

fn default_bind_address() -> String {
    "0.0.0.0:5001".to_string()
}

fn default_brand_name() -> String {
    "Climatrix SL".to_string()
}

fn default_max_concurrent_sends() -> usize {
    1
}

impl AppConfig {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            return Err(ConfigError::Validation(
                "jwt_secret must be at least 32 characters".into(),
            ));
        }
        if self.smtp.port == 0 {
            return Err(ConfigError::Validation("smtp.port must be > 0".into()));
        }
        if self.smtp.from.parse::<lettre::Address>().is_err() {
            return Err(ConfigError::Validation(format!(
                "smtp.from is not a valid email address: {}",
                self.smtp.from
            )));
        }
        if let Some(path) = &self.alerts.logo_path {
            let is_png = std::path::Path::new(path)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if !is_png {
                return Err(ConfigError::Validation(format!(
                    "alerts.logo_path must point to a .png file: {path}"
                )));
            }
        }
        if self.alerts.max_concurrent_sends == 0 {
            return Err(ConfigError::Validation(
                "alerts.max_concurrent_sends must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Any environment variable matching the key path separated by double underscores
/// (e.g. `SMTP__PORT`, `ALERTS__MAX_CONCURRENT_SENDS`) overrides the file value.
/// A `.env` file in the working directory is loaded first if present.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let _ = dotenvy::dotenv();

    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            bind_address: default_bind_address(),
            jwt_secret: "0123456789abcdef0123456789abcdef".into(),
            smtp: SmtpConfig {
                server: "smtp.example.com".into(),
                port: 587,
                username: "alerts@example.com".into(),
                password: "secret".into(),
                from: "alerts@example.com".into(),
            },
            alerts: AlertsConfig::default(),
        }
    }

    #[test]
    fn accepts_valid_config() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_short_jwt_secret() {
        let mut cfg = sample();
        cfg.jwt_secret = "short".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut cfg = sample();
        cfg.alerts.max_concurrent_sends = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn logo_path_must_be_png() {
        let mut cfg = sample();
        cfg.alerts.logo_path = Some("assets/logo.PNG".into());
        assert!(cfg.validate().is_ok());
        cfg.alerts.logo_path = Some("assets/logo.jpg".into());
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_bad_sender_address() {
        let mut cfg = sample();
        cfg.smtp.from = "not an address".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }
}
