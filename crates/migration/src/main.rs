use config::{Config, File, FileFormat};
use sea_orm_migration::prelude::*;
use std::env;

/// `database_url` from the service config file, if the file exists and sets it.
fn database_url_from_config(path: &str) -> Option<String> {
    Config::builder()
        .add_source(File::new(path, FileFormat::Yaml).required(false))
        .build()
        .ok()?
        .get_string("database_url")
        .ok()
}

fn main() {
    let _ = dotenvy::dotenv();

    // DATABASE_URL from the environment (or .env) wins over config.yaml
    if env::var("DATABASE_URL").is_err() {
        if let Some(url) = database_url_from_config("config.yaml") {
            // SAFETY: single-threaded here, the runtime is started below.
            unsafe { env::set_var("DATABASE_URL", url) };
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to start tokio runtime");
    runtime.block_on(cli::run_cli(migration::Migrator));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_config_file_yields_none() {
        let path = env::temp_dir().join("climatrix-migration-missing.yaml");
        let _ = fs::remove_file(&path);
        assert_eq!(database_url_from_config(path.to_str().unwrap()), None);
    }

    #[test]
    fn reads_database_url_from_yaml() {
        let path = env::temp_dir().join("climatrix-migration-config.yaml");
        fs::write(&path, "database_url: \"postgres://localhost/climatrix\"\n").unwrap();
        assert_eq!(
            database_url_from_config(path.to_str().unwrap()).as_deref(),
            Some("postgres://localhost/climatrix")
        );
        fs::remove_file(&path).unwrap();
    }
}
