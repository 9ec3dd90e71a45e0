use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,

    pub claude_api_key: String,
    pub claude_model: String,

    pub weather_api_key: String,
    pub weather_api_url: String,

    pub embedding_api_url: String,
    pub embedding_model: String,
    /// Pause between consecutive embedding calls (provider rate limit).
    pub embedding_delay_ms: u64,
    pub embedding_max_chunk_chars: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_access_ttl_secs: env::var("JWT_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "900".into())
                .parse()
                .expect("JWT_ACCESS_TTL_SECS must be a number"),
            jwt_refresh_ttl_secs: env::var("JWT_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "604800".into())
                .parse()
                .expect("JWT_REFRESH_TTL_SECS must be a number"),

            claude_api_key: env::var("CLAUDE_API_KEY").unwrap_or_else(|_| String::new()),
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),

            weather_api_key: env::var("WEATHER_API_KEY").unwrap_or_else(|_| String::new()),
            weather_api_url: env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "https://api.weatherapi.com/v1".into()),

            embedding_api_url: env::var("EMBEDDING_API_URL")
                .unwrap_or_else(|_| "http://localhost:11434/api/embeddings".into()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "nomic-embed-text".into()),
            embedding_delay_ms: env::var("EMBEDDING_DELAY_MS")
                .unwrap_or_else(|_| "200".into())
                .parse()
                .unwrap_or(200),
            embedding_max_chunk_chars: env::var("EMBEDDING_MAX_CHUNK_CHARS")
                .unwrap_or_else(|_| "1000".into())
                .parse()
                .unwrap_or(1000),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
