use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Payment gateway
    pub stripe_secret_key: String,
    pub stripe_api_url: String,

    // Document store
    pub redis_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;

        let config = Self {
            environment: environment.clone(),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY")
                .context("STRIPE_SECRET_KEY required")?,
            // Overridable so the gateway adapter can be pointed at a mock server.
            stripe_api_url: std::env::var("STRIPE_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),

            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Whether the configured gateway key has the shape the gateway issues.
    /// The key's presence is enforced at startup; this catches a pasted-in
    /// non-key value that would fail every gateway call.
    pub fn gateway_key_plausible(&self) -> bool {
        self.stripe_secret_key.starts_with("sk_")
            || self.stripe_secret_key.starts_with("rk_")
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.stripe_api_url.starts_with("http") {
            bail!("STRIPE_API_URL must be HTTP(S) URL");
        }

        // Live keys in development are almost always a pasted-in mistake.
        if matches!(self.environment, Environment::Development)
            && self.stripe_secret_key.starts_with("sk_live_")
        {
            bail!("Refusing to use a live gateway key in development");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: &str) -> Config {
        Config {
            environment: Environment::Development,
            host: "127.0.0.1".to_string(),
            port: 8080,
            stripe_secret_key: key.to_string(),
            stripe_api_url: "https://api.stripe.com".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
        }
    }

    #[test]
    fn gateway_key_plausibility_checks_the_key_shape() {
        assert!(config_with_key("sk_test_abc123").gateway_key_plausible());
        assert!(config_with_key("rk_live_abc123").gateway_key_plausible());
        assert!(!config_with_key("not-a-gateway-key").gateway_key_plausible());
        assert!(!config_with_key("pk_test_abc123").gateway_key_plausible());
    }
}
