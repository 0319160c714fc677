use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PushConfig {
    pub gateway_url: String,
    pub server_key: String,
    pub topic: String,
}

/// Mobile shell wrapper settings: where the packaged web view points and the
/// store-facing application identifier.
#[derive(Debug, Deserialize, Clone)]
pub struct ShellConfig {
    pub app_id: String,
    pub deployment_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub relay: RelayConfig,
    pub push: PushConfig,
    pub shell: ShellConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("TAMENY").separator("__"))
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${FIREBASE_SERVER_KEY}
        app_config.remote.url = expand_env(&app_config.remote.url);
        app_config.remote.api_key = expand_env(&app_config.remote.api_key);
        app_config.push.server_key = expand_env(&app_config.push.server_key);

        Ok(app_config)
    }
}

fn expand_env(val: &str) -> String {
    if val.starts_with("${") && val.ends_with('}') {
        let var_name = &val[2..val.len() - 1];
        std::env::var(var_name).unwrap_or_else(|_| "".to_string())
    } else {
        val.to_string()
    }
}
