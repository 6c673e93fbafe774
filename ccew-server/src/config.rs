//! Server configuration from environment variables (`.env` supported via
//! dotenvy in `main`).

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:5000`.
    pub bind_addr: String,
    /// Public base URL used when building form links for technicians.
    pub public_base_url: String,
    /// SMTP relay settings. `None` means no relay is configured and
    /// dispatch falls back to log-only mode (development).
    pub smtp: Option<SmtpConfig>,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
        port.parse::<u16>()
            .with_context(|| format!("PORT is not a valid port number: {port}"))?;
        let bind_addr = format!("0.0.0.0:{port}");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) if !host.trim().is_empty() => Some(SmtpConfig {
                host,
                username: std::env::var("SMTP_USERNAME").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
                from_address: std::env::var("MAIL_FROM")
                    .context("MAIL_FROM is required when SMTP_HOST is set")?,
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            public_base_url,
            smtp,
        })
    }
}
