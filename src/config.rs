use std::net::IpAddr;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub encryption_key: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub frontend_url: Option<String>,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub worker_count: usize,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;
        let encryption_key = env_required("FORMERR_ENCRYPTION_KEY")?;
        let github_client_id = env_required("GITHUB_CLIENT_ID")?;
        let github_client_secret = env_required("GITHUB_CLIENT_SECRET")?;

        let host: IpAddr = env_or("FORMERR_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMERR_HOST: {e}"))?;

        let port: u16 = env_or("FORMERR_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid FORMERR_PORT: {e}"))?;

        let base_url = env_or("FORMERR_BASE_URL", &format!("http://{host}:{port}"));
        let frontend_url = std::env::var("FORMERR_FRONTEND_URL").ok();

        let max_body_size: usize = env_or("FORMERR_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid FORMERR_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("FORMERR_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid FORMERR_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let worker_count: usize = env_or("FORMERR_WORKER_COUNT", "2")
            .parse()
            .map_err(|e| format!("Invalid FORMERR_WORKER_COUNT: {e}"))?;

        let log_level = env_or("FORMERR_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("FORMERR_SMTP_HOST").ok(),
            std::env::var("FORMERR_SMTP_PORT").ok(),
            std::env::var("FORMERR_SMTP_USER").ok(),
            std::env::var("FORMERR_SMTP_PASS").ok(),
            std::env::var("FORMERR_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid FORMERR_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            encryption_key,
            github_client_id,
            github_client_secret,
            host,
            port,
            base_url,
            frontend_url,
            max_body_size,
            trusted_proxies,
            worker_count,
            log_level,
            smtp,
        })
    }

    /// OAuth redirect URI registered with the GitHub application.
    pub fn github_redirect_uri(&self) -> String {
        format!("{}/auth/github/callback", self.base_url)
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
