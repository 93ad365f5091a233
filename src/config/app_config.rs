use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub qna: QnaSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote QnA service settings.
///
/// The runtime endpoint and its key are optional: without them the adapter
/// is built management-only and query calls fail at call time.
#[derive(Debug, Clone, Deserialize)]
pub struct QnaSettings {
    pub endpoint: String,
    pub subscription_key: String,
    pub runtime_endpoint: Option<String>,
    pub endpoint_key: Option<String>,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
}

fn default_score_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for QnaSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            subscription_key: String::new(),
            runtime_endpoint: None,
            endpoint_key: None,
            score_threshold: default_score_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
