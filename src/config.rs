use crate::error::{RegistryError, RegistryResult};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const ENV_PREFIX: &str = "METAREG";

const EMPTY_CONFIG: &str = r#"### metareg configuration file

### store driver: "mssql" (SQL Server) or "sqlite" (local file)
# driver = "mssql"

### SQL Server connection
# host = "localhost"
# port = 1433
# user = "sa"
# password = ""
# database = "metadata"
# trust_server_certificate = true

### with driver = "sqlite", `database` is the path of the SQLite file
# database = "~/.metareg/metareg.sqlite3"

### every setting can be overridden by METAREG_<NAME> environment variables,
### e.g. METAREG_PASSWORD, or by a .env file in the working directory.
### Only prefixed names are read: a .env line `host=...` is ignored, write
### `METAREG_HOST=...` instead.
"#;

/// Which store the registry talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreDriver {
    #[default]
    Mssql,
    Sqlite,
}

impl fmt::Display for StoreDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreDriver::Mssql => write!(f, "mssql"),
            StoreDriver::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StoreDriver {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql-server" => Ok(StoreDriver::Mssql),
            "sqlite" | "sqlite3" => Ok(StoreDriver::Sqlite),
            other => Err(RegistryError::Configuration(format!(
                "unknown driver '{}', expected 'mssql' or 'sqlite'",
                other
            ))),
        }
    }
}

/// Connection settings of a SQL Server store
#[derive(Clone, PartialEq, Eq)]
pub struct SqlServerSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub trust_server_certificate: bool,
}

impl fmt::Debug for SqlServerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlServerSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"(set)")
            .field("database", &self.database)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .finish()
    }
}

/// Validated settings for opening a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    /// Local SQLite file
    Sqlite { path: String },
    /// SQL Server database
    SqlServer(SqlServerSettings),
}

impl StoreSettings {
    pub fn driver(&self) -> StoreDriver {
        match self {
            StoreSettings::Sqlite { .. } => StoreDriver::Sqlite,
            StoreSettings::SqlServer(_) => StoreDriver::Mssql,
        }
    }
}

/// Effective configuration, as read from file and environment
///
/// Values are kept raw here; [`MetaregConfig::store_settings`] checks them.
#[derive(Debug, Clone)]
pub struct MetaregConfig {
    /// Path of the configuration file that was consulted
    pub config_file: String,

    pub driver: StoreDriver,
    pub host: Option<String>,
    pub port: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,

    /// SQL Server database name, or SQLite file path
    pub database: Option<String>,

    pub trust_server_certificate: bool,
}

impl MetaregConfig {
    /// Function to create and initialize a new configuration
    ///
    /// Sources, lowest precedence first: the TOML file (written from a
    /// template when missing), a `.env` file, `METAREG_*` environment
    /// variables.
    pub fn new(path: &Option<String>) -> RegistryResult<MetaregConfig> {
        let config_file = match path {
            Some(p) => p.clone(),
            None => {
                let dir = Self::config_dir()?;
                std::fs::create_dir_all(dir.as_str()).map_err(|e| {
                    RegistryError::Configuration(format!(
                        "unable to create metareg directory {}: {}",
                        dir, e
                    ))
                })?;
                format!("{}/metareg.toml", dir)
            }
        };

        if !Path::new(config_file.as_str()).exists() {
            std::fs::write(config_file.as_str(), EMPTY_CONFIG).map_err(|e| {
                RegistryError::Configuration(format!(
                    "unable to create config file {}: {}",
                    config_file, e
                ))
            })?;
        }

        // .env values never override variables already set in the process
        dotenvy::dotenv().ok();

        Self::load(config_file, ENV_PREFIX)
    }

    fn load(config_file: String, env_prefix: &str) -> RegistryResult<MetaregConfig> {
        let settings = Config::builder()
            .add_source(config::File::with_name(config_file.as_str()).required(false))
            .add_source(config::Environment::with_prefix(env_prefix))
            .build()
            .map_err(|e| {
                RegistryError::Configuration(format!("failed to build configuration: {}", e))
            })?;

        let values = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| {
                RegistryError::Configuration(format!("failed to read configuration: {}", e))
            })?;

        let driver = match values.get("driver") {
            Some(d) => d.parse()?,
            None => StoreDriver::default(),
        };

        let trust_server_certificate = match values.get("trust_server_certificate") {
            Some(v) => parse_bool("trust_server_certificate", v)?,
            None => true,
        };

        Ok(MetaregConfig {
            config_file,
            driver,
            host: values.get("host").cloned(),
            port: values.get("port").cloned(),
            user: values.get("user").cloned(),
            password: values.get("password").cloned(),
            database: values.get("database").cloned(),
            trust_server_certificate,
        })
    }

    /// Check the settings the selected driver needs
    ///
    /// Every missing key is reported at once.
    pub fn store_settings(&self) -> RegistryResult<StoreSettings> {
        match self.driver {
            StoreDriver::Sqlite => {
                let path = present(&self.database).ok_or_else(|| {
                    RegistryError::Configuration(
                        "missing required setting: database (path of the SQLite file)"
                            .to_string(),
                    )
                })?;
                Ok(StoreSettings::Sqlite {
                    path: expand_home(path),
                })
            }
            StoreDriver::Mssql => {
                let required = [
                    ("host", &self.host),
                    ("port", &self.port),
                    ("user", &self.user),
                    ("password", &self.password),
                    ("database", &self.database),
                ];
                let missing: Vec<&str> = required
                    .iter()
                    .filter(|(_, value)| present(value).is_none())
                    .map(|(key, _)| *key)
                    .collect();
                if !missing.is_empty() {
                    return Err(RegistryError::Configuration(format!(
                        "missing required settings: {}",
                        missing.join(", ")
                    )));
                }

                let port_str = present(&self.port).unwrap_or_default();
                let port = port_str.parse::<u16>().map_err(|e| {
                    RegistryError::Configuration(format!("invalid port '{}': {}", port_str, e))
                })?;

                Ok(StoreSettings::SqlServer(SqlServerSettings {
                    host: present(&self.host).unwrap_or_default().to_string(),
                    port,
                    user: present(&self.user).unwrap_or_default().to_string(),
                    password: self.password.clone().unwrap_or_default(),
                    database: present(&self.database).unwrap_or_default().to_string(),
                    trust_server_certificate: self.trust_server_certificate,
                }))
            }
        }
    }

    /// Password state for display; the value itself is never shown
    pub fn password_status(&self) -> &'static str {
        match present(&self.password) {
            Some(_) => "(set)",
            None => "(not set)",
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let show = |v: &Option<String>| present(v).unwrap_or("(not set)").to_string();
        let mut lines = vec![
            format!("Config File:        {}", self.config_file),
            format!("Driver:             {}", self.driver),
        ];
        match self.driver {
            StoreDriver::Mssql => {
                lines.push(format!("Host:               {}", show(&self.host)));
                lines.push(format!("Port:               {}", show(&self.port)));
                lines.push(format!("User:               {}", show(&self.user)));
                lines.push(format!("Password:           {}", self.password_status()));
                lines.push(format!("Database:           {}", show(&self.database)));
                lines.push(format!(
                    "Trust Server Cert:  {}",
                    self.trust_server_certificate
                ));
            }
            StoreDriver::Sqlite => {
                lines.push(format!("SQLite Path:        {}", show(&self.database)));
            }
        }
        lines.join("\n")
    }

    /// Get the default config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.metareg/metareg.toml", home_dir)
    }

    fn config_dir() -> RegistryResult<String> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| {
                RegistryError::Configuration("could not find home directory".to_string())
            })?
            .to_str()
            .ok_or_else(|| {
                RegistryError::Configuration(
                    "could not convert home directory path to string".to_string(),
                )
            })?
            .to_owned();
        Ok(format!("{}/.metareg", home_dir))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bool(key: &str, value: &str) -> RegistryResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        other => Err(RegistryError::Configuration(format!(
            "invalid boolean '{}' for {}",
            other, key
        ))),
    }
}

fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Prefix nothing in a test environment sets
    const NO_ENV: &str = "METAREG_TEST_UNSET";

    fn write_config(content: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metareg.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path.to_string_lossy().to_string())
    }

    #[test]
    fn test_full_mssql_config() {
        let (_dir, path) = write_config(
            r#"
host = "db.example.com"
port = 1433
user = "registry"
password = "s3cret"
database = "metadata"
"#,
        );
        let config = MetaregConfig::load(path, NO_ENV).unwrap();
        assert_eq!(config.driver, StoreDriver::Mssql);

        match config.store_settings().unwrap() {
            StoreSettings::SqlServer(s) => {
                assert_eq!(s.host, "db.example.com");
                assert_eq!(s.port, 1433);
                assert_eq!(s.user, "registry");
                assert_eq!(s.password, "s3cret");
                assert_eq!(s.database, "metadata");
                assert!(s.trust_server_certificate);
            }
            other => panic!("unexpected settings {:?}", other),
        }
    }

    #[test]
    fn test_missing_keys_are_all_reported() {
        let (_dir, path) = write_config("host = \"localhost\"\n");
        let config = MetaregConfig::load(path, NO_ENV).unwrap();

        match config.store_settings() {
            Err(RegistryError::Configuration(msg)) => {
                assert!(msg.contains("port"));
                assert!(msg.contains("user"));
                assert!(msg.contains("password"));
                assert!(msg.contains("database"));
                assert!(!msg.contains("host"));
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let (_dir, path) = write_config(
            r#"
host = "localhost"
port = 1433
user = "sa"
password = "pw"
database = "   "
"#,
        );
        let config = MetaregConfig::load(path, NO_ENV).unwrap();
        assert!(matches!(
            config.store_settings(),
            Err(RegistryError::Configuration(msg)) if msg.contains("database")
        ));
    }

    #[test]
    fn test_bad_port() {
        let (_dir, path) = write_config(
            r#"
host = "localhost"
port = "not-a-port"
user = "sa"
password = "pw"
database = "metadata"
"#,
        );
        let config = MetaregConfig::load(path, NO_ENV).unwrap();
        assert!(matches!(
            config.store_settings(),
            Err(RegistryError::Configuration(msg)) if msg.contains("invalid port")
        ));
    }

    #[test]
    fn test_sqlite_driver_needs_only_path() {
        let (_dir, path) = write_config(
            r#"
driver = "sqlite"
database = "/tmp/registry.sqlite3"
"#,
        );
        let config = MetaregConfig::load(path, NO_ENV).unwrap();
        assert_eq!(
            config.store_settings().unwrap(),
            StoreSettings::Sqlite {
                path: "/tmp/registry.sqlite3".to_string()
            }
        );
    }

    #[test]
    fn test_sqlite_driver_without_path() {
        let (_dir, path) = write_config("driver = \"sqlite\"\n");
        let config = MetaregConfig::load(path, NO_ENV).unwrap();
        assert!(matches!(
            config.store_settings(),
            Err(RegistryError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_driver() {
        let (_dir, path) = write_config("driver = \"oracle\"\n");
        assert!(matches!(
            MetaregConfig::load(path, NO_ENV),
            Err(RegistryError::Configuration(_))
        ));
    }

    #[test]
    fn test_trust_server_certificate_override() {
        let (_dir, path) = write_config("trust_server_certificate = false\n");
        let config = MetaregConfig::load(path, NO_ENV).unwrap();
        assert!(!config.trust_server_certificate);
    }

    #[test]
    fn test_environment_overrides_file() {
        let (_dir, path) = write_config("host = \"from-file\"\n");
        std::env::set_var("METAREG_ENVTEST_HOST", "from-env");
        let config = MetaregConfig::load(path, "METAREG_ENVTEST").unwrap();
        std::env::remove_var("METAREG_ENVTEST_HOST");
        assert_eq!(config.host.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_template_written_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.toml");
        let config = MetaregConfig::new(&Some(path.to_string_lossy().to_string())).unwrap();

        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("metareg configuration file"));
        assert!(content.contains("`METAREG_HOST=...`"));
        assert_eq!(config.config_file, path.to_string_lossy());
    }

    #[test]
    fn test_summary_hides_password() {
        let (_dir, path) = write_config("password = \"hunter2\"\n");
        let config = MetaregConfig::load(path, NO_ENV).unwrap();
        let summary = config.summary();
        assert!(!summary.contains("hunter2"));
        assert!(summary.contains("(set)"));
        assert_eq!(config.password_status(), "(set)");
    }

    #[test]
    fn test_settings_debug_hides_password() {
        let settings = SqlServerSettings {
            host: "localhost".to_string(),
            port: 1433,
            user: "sa".to_string(),
            password: "hunter2".to_string(),
            database: "metadata".to_string(),
            trust_server_certificate: true,
        };
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }

    #[test]
    fn test_driver_parsing() {
        assert_eq!("SQLite".parse::<StoreDriver>().unwrap(), StoreDriver::Sqlite);
        assert_eq!(
            "sqlserver".parse::<StoreDriver>().unwrap(),
            StoreDriver::Mssql
        );
        assert!("postgres".parse::<StoreDriver>().is_err());
    }
}
