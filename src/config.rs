use std::env;

use crate::stripe::StripeConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Public origin used for Stripe success/cancel/return URLs.
    pub base_url: String,
    pub stripe: StripeConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let stripe = StripeConfig {
            secret_key: env::var("STRIPE_SECRET_KEY")?,
            webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")?,
            api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
        };
        Ok(Self {
            port,
            database_url,
            host,
            base_url,
            stripe,
        })
    }
}
