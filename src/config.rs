use serde::Deserialize;

const DEFAULT_TTL_MINUTES: i64 = 60 * 24;
/// One year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
    pub seed_demo_data: bool,
}

/// Unparsable values fall back to the default; the rest are kept within
/// one minute and [`MAX_TTL_MINUTES`].
fn ttl_minutes(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|m| m.clamp(1, MAX_TTL_MINUTES))
        .unwrap_or(DEFAULT_TTL_MINUTES)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "yoga-studio".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "yoga-studio-users".into()),
            ttl_minutes: ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref()),
        };
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        let seed_demo_data = std::env::var("SEED_DEMO_DATA")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt,
            host,
            port,
            seed_demo_data,
        })
    }

    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            host: "127.0.0.1".into(),
            port: 0,
            seed_demo_data: false,
        }
    }
}
