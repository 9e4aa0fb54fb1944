#[derive(Debug, Clone)]
pub struct Config {
    /// Port the server listens on
    pub port: u16,
    /// Path to the SQLite database
    pub database_url: String,
    /// The single account allowed on the admin dashboard
    pub admin_email: String,
    /// Base URL of the OpenAI-compatible completion API
    pub completion_base_url: String,
    /// API key for the completion API. Optional so the server can boot
    /// without one; generation then fails with the in-stream marker.
    pub completion_api_key: Option<String>,
    /// Model name sent to the completion API
    pub completion_model: String,
    /// Directory holding the built frontend assets
    pub frontend_dist: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_parse("CONECTA_PORT", 8080)?,
            database_url: env_str("CONECTA_DATABASE_URL", "sqlite:./data/conecta.db"),
            admin_email: env_str("CONECTA_ADMIN_EMAIL", "juliaojunior@gmail.com"),
            completion_base_url: env_str("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            completion_api_key: std::env::var("OPENAI_API_KEY").ok(),
            completion_model: env_str("OPENAI_MODEL", "gpt-4.1"),
            frontend_dist: env_str("FRONTEND_DIST", "./dist"),
        })
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}
