//! Configuration for the console orchestration layer.
//!
//! This module contains the configuration types and loading functionality.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::warn;

use crate::error::{ConsoleError, ConsoleResult};
use crate::orchestrator::RetryPolicy;

/// Console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the workflow API
    pub workflow_api_url: String,

    /// Base URL of the role directory
    #[serde(default)]
    pub role_api_url: String,

    /// Base URL of the user directory
    #[serde(default)]
    pub user_api_url: String,

    /// Attempts when reading a just-created workflow back
    #[serde(default = "default_fetch_retry_count")]
    pub fetch_retry_count: u32,

    /// Delay between read attempts, in milliseconds
    #[serde(default = "default_fetch_retry_delay_ms")]
    pub fetch_retry_delay_ms: u64,

    /// Debounce applied to entity search input, in milliseconds
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Page size for the workflow list
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_fetch_retry_count() -> u32 {
    5
}

fn default_fetch_retry_delay_ms() -> u64 {
    2000
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_list_page_size() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ConsoleConfig {
    /// Load configuration from environment variables
    pub fn load() -> ConsoleResult<Self> {
        // Start with defaults
        let mut config = Self::default();

        // Override from environment variables
        if let Ok(workflow_api_url) = env::var("WORKFLOW_API_URL") {
            config.workflow_api_url = workflow_api_url;
        }

        if let Ok(role_api_url) = env::var("ROLE_API_URL") {
            config.role_api_url = role_api_url;
        }

        if let Ok(user_api_url) = env::var("USER_API_URL") {
            config.user_api_url = user_api_url;
        }

        if let Ok(retry_count) = env::var("WORKFLOW_FETCH_RETRY_COUNT") {
            if let Ok(count) = retry_count.parse::<u32>() {
                config.fetch_retry_count = count;
            } else {
                warn!("Invalid WORKFLOW_FETCH_RETRY_COUNT value: {}", retry_count);
            }
        }

        if let Ok(retry_delay) = env::var("WORKFLOW_FETCH_RETRY_DELAY_MS") {
            if let Ok(delay) = retry_delay.parse::<u64>() {
                config.fetch_retry_delay_ms = delay;
            } else {
                warn!("Invalid WORKFLOW_FETCH_RETRY_DELAY_MS value: {}", retry_delay);
            }
        }

        if let Ok(debounce) = env::var("ENTITY_SEARCH_DEBOUNCE_MS") {
            if let Ok(ms) = debounce.parse::<u64>() {
                config.search_debounce_ms = ms;
            } else {
                warn!("Invalid ENTITY_SEARCH_DEBOUNCE_MS value: {}", debounce);
            }
        }

        if let Ok(page_size) = env::var("WORKFLOW_LIST_PAGE_SIZE") {
            if let Ok(size) = page_size.parse::<usize>() {
                if size > 0 {
                    config.list_page_size = size;
                } else {
                    warn!("WORKFLOW_LIST_PAGE_SIZE must be positive, keeping default");
                }
            } else {
                warn!("Invalid WORKFLOW_LIST_PAGE_SIZE value: {}", page_size);
            }
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level;
        }

        // Validate required fields
        if config.workflow_api_url.is_empty() {
            return Err(ConsoleError::Configuration(
                "Workflow API URL is required".to_string(),
            ));
        }

        Ok(config)
    }

    /// Retry policy for reading a just-created workflow back.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.fetch_retry_count,
            delay: Duration::from_millis(self.fetch_retry_delay_ms),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            workflow_api_url: String::new(),
            role_api_url: String::new(),
            user_api_url: String::new(),
            fetch_retry_count: default_fetch_retry_count(),
            fetch_retry_delay_ms: default_fetch_retry_delay_ms(),
            search_debounce_ms: default_search_debounce_ms(),
            list_page_size: default_list_page_size(),
            log_level: default_log_level(),
        }
    }
}
