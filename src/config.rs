use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; feedback is kept in memory when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum pooled PostgreSQL connections
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Recommendation count used when a request does not specify one
    #[serde(default = "default_recommendation_limit")]
    pub default_recommendation_limit: usize,

    /// Requested counts above this are clamped
    #[serde(default = "max_recommendation_limit")]
    pub max_recommendation_limit: usize,

    /// Issued recommendations kept by the in-memory feedback sink
    #[serde(default = "default_memory_feedback_capacity")]
    pub memory_feedback_capacity: usize,
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_recommendation_limit() -> usize {
    10
}

fn max_recommendation_limit() -> usize {
    100
}

fn default_memory_feedback_capacity() -> usize {
    crate::services::feedback::DEFAULT_MEMORY_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: default_database_max_connections(),
            host: default_host(),
            port: default_port(),
            default_recommendation_limit: default_recommendation_limit(),
            max_recommendation_limit: max_recommendation_limit(),
            memory_feedback_capacity: default_memory_feedback_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?
            .validate()
    }

    /// Rejects limit settings the recommendation endpoint could never honour
    pub fn validate(self) -> anyhow::Result<Self> {
        if self.max_recommendation_limit < 1 {
            anyhow::bail!("MAX_RECOMMENDATION_LIMIT must be at least 1");
        }
        if self.default_recommendation_limit < 1 {
            anyhow::bail!("DEFAULT_RECOMMENDATION_LIMIT must be at least 1");
        }
        if self.default_recommendation_limit > self.max_recommendation_limit {
            anyhow::bail!(
                "DEFAULT_RECOMMENDATION_LIMIT ({}) exceeds MAX_RECOMMENDATION_LIMIT ({})",
                self.default_recommendation_limit,
                self.max_recommendation_limit
            );
        }
        if self.memory_feedback_capacity < 1 {
            anyhow::bail!("MEMORY_FEEDBACK_CAPACITY must be at least 1");
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves a requested count: `None` uses the default, values above the
    /// maximum are clamped, non-positive values are returned as-is for the
    /// caller to reject
    pub fn effective_limit(&self, requested: Option<i64>) -> Result<usize, i64> {
        match requested {
            None => Ok(self.default_recommendation_limit),
            Some(n) if n < 1 => Err(n),
            Some(n) => Ok(usize::try_from(n)
                .unwrap_or(usize::MAX)
                .min(self.max_recommendation_limit)),
        }
    }
}
