//! Tool configuration and the default registry

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::error::{ToolError, ToolResult};
use crate::gmail::{GmailTool, GMAIL_API_BASE};
use crate::math::MathTool;
use crate::registry::ToolRegistry;
use crate::search::{SearchTool, DEFAULT_MAX_RESULTS, TAVILY_BASE_URL};
use crate::translate::{TranslateTool, DEFAULT_TRANSLATE_URL};
use crate::weather::{WeatherEndpoints, WeatherTool};

/// Translation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Register the agent
    pub enabled: bool,
    /// LibreTranslate-compatible base URL (`TRANSLATE_API_URL`)
    pub api_url: String,
    /// API key, if the instance requires one (`TRANSLATE_API_KEY`)
    pub api_key: Option<String>,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: DEFAULT_TRANSLATE_URL.to_string(),
            api_key: None,
        }
    }
}

/// Web search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Register the agent
    pub enabled: bool,
    /// Tavily key (`TAVILY_API_KEY`)
    pub api_key: Option<String>,
    /// API base
    pub api_url: String,
    /// Hits per query
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            api_url: TAVILY_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Gmail settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GmailConfig {
    /// Register the agent
    pub enabled: bool,
    /// Token file (`GMAIL_CREDENTIALS`)
    pub credentials: Option<PathBuf>,
    /// API base for the authenticated user
    pub api_url: String,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            credentials: None,
            api_url: GMAIL_API_BASE.to_string(),
        }
    }
}

/// Weather settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Register the agent
    pub enabled: bool,
    /// Forecast endpoint
    pub forecast_url: String,
    /// Air-quality endpoint
    pub air_quality_url: String,
    /// Geocoding endpoint
    pub geocode_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let endpoints = WeatherEndpoints::default();
        Self {
            enabled: true,
            forecast_url: endpoints.forecast,
            air_quality_url: endpoints.air_quality,
            geocode_url: endpoints.geocode,
        }
    }
}

/// Configuration of all tool agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Register the math agent
    pub math: bool,
    /// Translation agent
    pub translate: TranslateConfig,
    /// Search agent
    pub search: SearchConfig,
    /// Gmail agent
    pub gmail: GmailConfig,
    /// Weather agent
    pub weather: WeatherConfig,
    /// Per-request timeout for remote services, seconds
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            math: true,
            translate: TranslateConfig::default(),
            search: SearchConfig::default(),
            gmail: GmailConfig::default(),
            weather: WeatherConfig::default(),
            timeout_secs: 20,
        }
    }
}

fn check_url(name: &str, value: &str) -> ToolResult<()> {
    let url = Url::parse(value)
        .map_err(|e| ToolError::unavailable(name, format!("invalid URL '{value}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ToolError::unavailable(
            name,
            format!("URL '{value}' must be http or https"),
        ));
    }
    Ok(())
}

impl ToolsConfig {
    /// Check every endpoint of an enabled agent is an http(s) URL
    pub fn validate(&self) -> ToolResult<()> {
        if self.translate.enabled {
            check_url("translate", &self.translate.api_url)?;
        }
        if self.search.enabled {
            check_url("search", &self.search.api_url)?;
        }
        if self.gmail.enabled {
            check_url("gmail", &self.gmail.api_url)?;
        }
        if self.weather.enabled {
            check_url("weather", &self.weather.forecast_url)?;
            check_url("weather", &self.weather.air_quality_url)?;
            check_url("weather", &self.weather.geocode_url)?;
        }
        Ok(())
    }

    /// Build a registry with every enabled agent
    pub fn build_registry(&self) -> ToolResult<ToolRegistry> {
        self.validate()?;
        let timeout = Duration::from_secs(self.timeout_secs.max(1));
        let mut registry = ToolRegistry::new();

        if self.math {
            registry = registry.with_tool(MathTool::new());
        }
        if self.translate.enabled {
            registry = registry.with_tool(TranslateTool::new(
                &self.translate.api_url,
                self.translate.api_key.clone(),
                timeout,
            ));
        }
        if self.search.enabled {
            registry = registry.with_tool(
                SearchTool::new(self.search.api_key.clone(), timeout)
                    .with_base_url(&self.search.api_url)
                    .with_max_results(self.search.max_results),
            );
        }
        if self.gmail.enabled {
            registry = registry.with_tool(
                GmailTool::new(self.gmail.credentials.clone(), timeout)
                    .with_base_url(&self.gmail.api_url),
            );
        }
        if self.weather.enabled {
            let endpoints = WeatherEndpoints {
                forecast: self.weather.forecast_url.clone(),
                air_quality: self.weather.air_quality_url.clone(),
                geocode: self.weather.geocode_url.clone(),
            };
            registry = registry.with_tool(WeatherTool::with_endpoints(endpoints, timeout));
        }

        info!(
            agents = ?registry.kinds(),
            functions = registry.len(),
            "Tool registry ready"
        );
        Ok(registry)
    }
}
