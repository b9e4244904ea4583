use serde::Deserialize;

/// Environment variable holding the flight-status provider key
pub const FLIGHT_STATUS_KEY_VAR: &str = "AVIATIONSTACK_API_KEY";
/// Environment variable holding the fare provider key
pub const FARE_KEY_VAR: &str = "SKYSCANNER_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub providers: ProviderSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory holding the built frontend bundle
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    pub flight_status_url: String,
    pub fare_url: String,
    /// Prefix for booking links the fare provider returns as relative paths
    pub booking_domain: String,
}

impl Settings {
    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080_i64)?
            .set_default("server.static_dir", "flight-finder-frontend/dist")?
            .set_default("providers.flight_status_url", "http://api.aviationstack.com/v1")?
            .set_default(
                "providers.fare_url",
                "https://partners.api.skyscanner.net/apiservices/v3",
            )?
            .set_default("providers.booking_domain", "https://www.skyscanner.net")
    }

    /// Built-in defaults, then `config/default.toml` if present, then the environment.
    ///
    /// Eg. `FLIGHT_FINDER__SERVER__PORT=9000` sets `server.port`. Provider keys are not part of
    /// this; they are read on every request.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::defaults()?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("FLIGHT_FINDER").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Where provider API keys come from
pub trait KeySource: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads keys from the process environment at call time, so rotating a key needs no restart
pub struct EnvKeys;

impl KeySource for EnvKeys {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
pub struct StaticKeys(pub Vec<(&'static str, &'static str)>);

#[cfg(test)]
impl KeySource for StaticKeys {
    fn get(&self, name: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    }
}

#[cfg(test)]
mod settings_tests {
    use super::{EnvKeys, KeySource, Settings};

    #[test]
    fn test_defaults() {
        let settings: Settings = Settings::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.providers.booking_domain, "https://www.skyscanner.net");
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let settings: Settings = Settings::defaults()
            .unwrap()
            .set_override("server.port", 9090_i64)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 9090);
    }

    #[test]
    fn test_env_keys_ignore_unset() {
        assert_eq!(EnvKeys.get("FLIGHT_FINDER_TEST_KEY_THAT_IS_NEVER_SET"), None);
    }
}
