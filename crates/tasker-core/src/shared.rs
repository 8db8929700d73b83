//! Helpers shared by the identity and task API clients.

use anyhow::{Context, Result};

/// Standard User-Agent header for Tasker API requests.
pub const USER_AGENT: &str = concat!("tasker/", env!("CARGO_PKG_VERSION"));

/// Env var that, when set to `1`, refuses requests to production endpoints.
pub const BLOCK_REAL_API_ENV: &str = "TASKER_BLOCK_REAL_API";

/// Resolves a base URL with precedence: env > config > default.
///
/// # Arguments
/// * `config_base_url` - Value from config file (if present)
/// * `env_var` - Environment variable name (e.g., "`TASKER_API_URL`")
/// * `default_url` - Default URL if neither env nor config is set
/// * `service_name` - Human-readable service name for error messages
///
/// # Errors
/// Returns an error if the env or config value is not a valid URL.
pub fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
    service_name: &str,
) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.to_string());
        }
    }

    Ok(default_url.to_string())
}

fn validate_url(url: &str, service_name: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid {service_name} URL: {url}"))?;
    Ok(())
}

/// Joins a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// True when the real-API guard is on and `url` points at a production host.
///
/// Integration tests set `TASKER_BLOCK_REAL_API=1` so a misconfigured test
/// fails fast instead of reaching AWS.
pub fn real_api_blocked(url: &str) -> bool {
    std::env::var(BLOCK_REAL_API_ENV).is_ok_and(|v| v == "1") && is_production_host(url)
}

fn is_production_host(url: &str) -> bool {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .is_some_and(|host| host.ends_with(".amazonaws.com"))
}

/// Returns a masked version of a token for logs (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 || !token.is_char_boundary(12) {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_uses_config_then_default() {
        let env_var = "TASKER_TEST_UNSET_URL_VAR";
        assert_eq!(
            resolve_base_url(Some(" http://localhost:8080 "), env_var, "https://d", "x").unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            resolve_base_url(Some("  "), env_var, "https://d", "x").unwrap(),
            "https://d"
        );
        assert!(resolve_base_url(Some("not a url"), env_var, "https://d", "x").is_err());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h/prod/", "/tasks"), "http://h/prod/tasks");
        assert_eq!(join_url("http://h", "tasks/1"), "http://h/tasks/1");
    }

    #[test]
    fn test_production_host_detection() {
        assert!(is_production_host("https://cognito-idp.us-east-1.amazonaws.com"));
        assert!(!is_production_host("http://127.0.0.1:4000"));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("eyJraWQiOiJhYmMiLCJhbGciOi"), "eyJraWQiOiJh...");
        assert_eq!(mask_token("short"), "***");
    }
}
