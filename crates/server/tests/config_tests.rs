use climatrix_alerts::config::{AppConfig, ConfigError, SmtpConfig};
use config::Config;

fn from_yaml(yaml: &str) -> AppConfig {
    Config::builder()
        .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
        .build()
        .expect("Failed to build config")
        .try_deserialize()
        .expect("Failed to deserialize app config")
}

const MINIMAL: &str = r#"
database_url: "postgres://localhost/climatrix"
jwt_secret: "0123456789abcdef0123456789abcdef"
smtp:
  server: "smtp.gmail.com"
  port: 587
  username: "alerts@climatrix.example"
  password: "app-password"
  from: "alerts@climatrix.example"
"#;

#[test]
fn test_smtp_config_deserialization() {
    let yaml_content = r#"
server: "smtp.example.com"
port: 587
username: "user@example.com"
password: "secret123"
from: "noreply@example.com"
"#;

    let smtp_config: SmtpConfig = Config::builder()
        .add_source(config::File::from_str(
            yaml_content,
            config::FileFormat::Yaml,
        ))
        .build()
        .expect("Failed to build config")
        .try_deserialize()
        .expect("Failed to deserialize SMTP config");
    assert_eq!(smtp_config.server, "smtp.example.com");
    assert_eq!(smtp_config.port, 587);
    assert_eq!(smtp_config.from, "noreply@example.com");
}

#[test]
fn test_defaults_applied() {
    let app_config = from_yaml(MINIMAL);
    assert_eq!(app_config.bind_address, "0.0.0.0:5001");
    assert_eq!(app_config.alerts.brand_name, "Climatrix SL");
    assert_eq!(app_config.alerts.logo_path, None);
    assert_eq!(app_config.alerts.max_concurrent_sends, 1);
    assert!(app_config.validate().is_ok());
}

#[test]
fn test_alerts_section_overrides() {
    let yaml = format!(
        "{MINIMAL}\nbind_address: \"127.0.0.1:8080\"\nalerts:\n  brand_name: \"Acme\"\n  logo_path: \"assets/logo.png\"\n  max_concurrent_sends: 4\n"
    );
    let app_config = from_yaml(&yaml);
    assert_eq!(app_config.bind_address, "127.0.0.1:8080");
    assert_eq!(app_config.alerts.brand_name, "Acme");
    assert_eq!(app_config.alerts.logo_path.as_deref(), Some("assets/logo.png"));
    assert_eq!(app_config.alerts.max_concurrent_sends, 4);
}

#[test]
fn test_missing_smtp_section_fails() {
    let result = Config::builder()
        .add_source(config::File::from_str(
            "database_url: \"x\"\njwt_secret: \"y\"\n",
            config::FileFormat::Yaml,
        ))
        .build()
        .expect("Failed to build config")
        .try_deserialize::<AppConfig>();
    assert!(result.is_err());
}

#[test]
fn test_validation_errors() {
    let mut app_config = from_yaml(MINIMAL);
    app_config.alerts.max_concurrent_sends = 0;
    let err = app_config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("max_concurrent_sends"));

    let mut app_config = from_yaml(MINIMAL);
    app_config.jwt_secret = "too-short".into();
    assert!(matches!(
        app_config.validate(),
        Err(ConfigError::Validation(_))
    ));
}
