use crate::config::types::{
    CrawlConfig, CrawlSettings, NetworkSettings, WorkerSettings, MAX_KEYWORDS, UPPER_LIMIT_PAGES,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_crawl_settings(&config.crawl)?;
    validate_worker_settings(&config.workers)?;
    validate_network_settings(&config.network)?;
    Ok(())
}

/// Validates the seed URL, keyword list and page budget
fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    let url = Url::parse(&settings.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", settings.seed_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use the http or https scheme",
            settings.seed_url
        )));
    }

    if settings.keywords.len() > MAX_KEYWORDS {
        return Err(ConfigError::Validation(format!(
            "At most {} keywords are allowed, got {}",
            MAX_KEYWORDS,
            settings.keywords.len()
        )));
    }

    if settings.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "Keywords cannot be blank".to_string(),
        ));
    }

    if settings.max_pages < 1 || settings.max_pages > UPPER_LIMIT_PAGES {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            UPPER_LIMIT_PAGES, settings.max_pages
        )));
    }

    Ok(())
}

/// Validates pool sizes and worker timing
fn validate_worker_settings(settings: &WorkerSettings) -> Result<(), ConfigError> {
    for (name, size) in [("fetchers", settings.fetchers), ("parsers", settings.parsers)] {
        if !(1..=64).contains(&size) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and 64, got {}",
                name, size
            )));
        }
    }

    if !(1..=1000).contains(&settings.poll_interval_ms) {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be between 1 and 1000, got {}",
            settings.poll_interval_ms
        )));
    }

    Ok(())
}

/// Validates timeouts and the user agent
fn validate_network_settings(settings: &NetworkSettings) -> Result<(), ConfigError> {
    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if settings.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            settings.request_timeout_ms
        )));
    }

    if settings.robots_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "robots_timeout_ms must be >= 100ms, got {}ms",
            settings.robots_timeout_ms
        )));
    }

    Ok(())
}
