//! Layered service settings
//!
//! Settings are read from an optional TOML file (`config/relief.toml`, or the
//! path in `RELIEF_CONFIG`) and then overridden by `RELIEF__<SECTION>__<KEY>`
//! environment variables. Each consumer deserializes its own section.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, warn};

/// Default location of the settings file, relative to the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "config/relief.toml";

/// Listen addresses of the HTTP services, read from the `[http]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub api_addr: SocketAddr,
    pub auth_addr: SocketAddr,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from(([0, 0, 0, 0], 4000)),
            auth_addr: SocketAddr::from(([0, 0, 0, 0], 4001)),
        }
    }
}

impl HttpSettings {
    /// Load the `[http]` section
    pub fn load() -> Result<Self, ConfigError> {
        load_section("http")
    }
}

/// Load a settings section from the default file and the environment
///
/// A missing file or a missing section yields `T::default()`; individual
/// fields fall back to their serde defaults.
pub fn load_section<T>(section: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let path = std::env::var("RELIEF_CONFIG").unwrap_or_else(|_| DEFAULT_SETTINGS_FILE.to_string());
    load_section_from(Path::new(&path), section)
}

/// Load a settings section from an explicit file path and the environment
pub fn load_section_from<T>(path: &Path, section: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    let environment = Environment::with_prefix("RELIEF")
        .separator("__")
        .try_parsing(true);

    let settings = match Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(environment.clone())
        .build()
    {
        Ok(settings) => settings,
        Err(err) => {
            warn!(
                "Failed to read settings file {}, using environment only: {}",
                path.display(),
                err
            );
            Config::builder().add_source(environment).build()?
        }
    };

    match settings.get::<T>(section) {
        Ok(value) => Ok(value),
        Err(ConfigError::NotFound(_)) => {
            debug!("Settings section [{}] not found, using defaults", section);
            Ok(T::default())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serial_test::serial;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        radius_km: f64,
        label: String,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                radius_km: 50.0,
                label: "default".to_string(),
            }
        }
    }

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).expect("Failed to write temp settings file");
        path
    }

    #[test]
    #[serial]
    fn http_addresses_parse_from_file() {
        let path = temp_file("settings-http", "[http]\napi_addr = \"127.0.0.1:8080\"\n");

        let http: HttpSettings = load_section_from(&path, "http").unwrap();
        assert_eq!(http.api_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(http.auth_addr, HttpSettings::default().auth_addr);

        std::fs::remove_file(path).ok();
    }

    #[test]
    #[serial]
    fn missing_file_and_section_yield_defaults() {
        let sample: Sample =
            load_section_from(Path::new("/nonexistent/relief.toml"), "sample").unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    #[serial]
    fn file_values_override_defaults_field_by_field() {
        let path = temp_file("settings-file", "[sample]\nradius_km = 12.5\n");

        let sample: Sample = load_section_from(&path, "sample").unwrap();
        assert_eq!(sample.radius_km, 12.5);
        assert_eq!(sample.label, "default");

        std::fs::remove_file(path).ok();
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        let path = temp_file("settings-env", "[sample]\nradius_km = 12.5\n");
        unsafe {
            std::env::set_var("RELIEF__SAMPLE__RADIUS_KM", "7");
        }

        let sample: Sample = load_section_from(&path, "sample").unwrap();
        assert_eq!(sample.radius_km, 7.0);

        unsafe {
            std::env::remove_var("RELIEF__SAMPLE__RADIUS_KM");
        }
        std::fs::remove_file(path).ok();
    }
}
