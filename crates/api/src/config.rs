/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development, except
/// the narrator key which simply disables the feature when absent.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session token lifetime in hours (default: `24`).
    pub session_ttl_hours: i64,
    /// Detection model configuration.
    pub model: ModelConfig,
    /// Narrator configuration; `None` when no API key is configured.
    pub narrator: Option<NarratorConfig>,
}

/// Detection model settings.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Path to the ONNX model artifact.
    pub path: String,
    /// Square input size the model was exported with.
    pub input_size: u32,
    /// Class labels in model output order.
    pub labels: Vec<String>,
}

/// Generative text API settings.
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                             |
    /// |------------------------|-----------------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                           |
    /// | `PORT`                 | `3000`                                              |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                             |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                                |
    /// | `SESSION_TTL_HOURS`    | `24`                                                |
    /// | `MODEL_PATH`           | `models/best.onnx`                                  |
    /// | `MODEL_INPUT_SIZE`     | `640`                                               |
    /// | `MODEL_LABELS`         | `ripe,unripe,diseased`                              |
    /// | `GEMINI_API_URL`       | `https://generativelanguage.googleapis.com/v1beta`  |
    /// | `GEMINI_API_KEY`       | unset (narrator disabled)                           |
    /// | `GEMINI_MODEL`         | library default                                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_ttl_hours: i64 = std::env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("SESSION_TTL_HOURS must be a valid i64");

        let model = ModelConfig {
            path: std::env::var("MODEL_PATH").unwrap_or_else(|_| "models/best.onnx".into()),
            input_size: std::env::var("MODEL_INPUT_SIZE")
                .unwrap_or_else(|_| "640".into())
                .parse()
                .expect("MODEL_INPUT_SIZE must be a valid u32"),
            labels: std::env::var("MODEL_LABELS")
                .unwrap_or_else(|_| "ripe,unripe,diseased".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };

        let narrator = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(|api_key| NarratorConfig {
                api_url: std::env::var("GEMINI_API_URL").unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com/v1beta".into()
                }),
                api_key,
                model: std::env::var("GEMINI_MODEL").ok(),
            });

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session_ttl_hours,
            model,
            narrator,
        }
    }
}
