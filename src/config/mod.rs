//! Runtime configuration — environment variables, with hard failure on
//! a missing signing secret in release builds.

use tracing::warn;

/// Controls whether diagnostic error detail is attached to failure
/// responses (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    fn from_env() -> Self {
        match std::env::var("RUN_MODE").as_deref() {
            Ok("production") => RunMode::Production,
            _ => RunMode::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub bind_address: String,
    /// HS256 signing secret used to verify incoming bearer tokens.
    pub jwt_signing_secret: String,
    /// Token lifetime enforced on top of the token's own `exp` claim.
    pub token_ttl_secs: u64,
    pub run_mode: RunMode,
    pub recommendation_timeout_secs: u64,
    pub power_loss_timeout_secs: u64,
}

impl ServiceConfig {
    /// Loads configuration from environment variables.
    ///
    /// `DATABASE_URL` wins over the individual `DB_HOST`/`DB_PORT`/
    /// `DB_NAME`/`DB_USER`/`DB_PASS` components when both are present,
    /// letting local development pass one URL instead of five variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            let host = std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
            let name = std::env::var("DB_NAME").unwrap_or_else(|_| "agro".to_string());
            let user = std::env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
            let pass = std::env::var("DB_PASS").unwrap_or_default();
            format!("postgres://{user}:{pass}@{host}:{port}/{name}")
        });

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let run_mode = RunMode::from_env();

        let jwt_signing_secret = match std::env::var("JWT_SIGNING_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                if matches!(run_mode, RunMode::Production) {
                    anyhow::bail!(
                        "JWT_SIGNING_SECRET environment variable is not set. \
                         The service cannot start in production mode without a signing secret."
                    );
                }
                warn!("JWT_SIGNING_SECRET not set, using default dev secret — do NOT use in production");
                "dev-signing-secret".to_string()
            }
        };

        let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Ok(Self {
            database_url,
            bind_address,
            jwt_signing_secret,
            token_ttl_secs,
            run_mode,
            recommendation_timeout_secs: 15,
            power_loss_timeout_secs: 10,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_defaults_to_development() {
        std::env::remove_var("RUN_MODE");
        assert_eq!(RunMode::from_env(), RunMode::Development);
    }
}
