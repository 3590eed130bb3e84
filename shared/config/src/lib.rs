//! Environment-driven configuration for the wheat germplasm graph service.

use serde::{Deserialize, Serialize};

/// Neo4j connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
    pub fetch_size: usize,
}

/// OpenAI-compatible text-generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Row bounds for the aggregation views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLimits {
    /// Per relationship type in the overview
    pub overview_per_type: usize,
    pub grows_in: usize,
    pub affected_by: usize,
    pub search: usize,
    pub sample: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            overview_per_type: 25,
            grows_in: 1000,
            affected_by: 100,
            search: 50,
            sample: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub neo4j: Neo4jConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub limits: ViewLimits,
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; missing or unparsable values
    /// fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let defaults = ViewLimits::default();

        let config = Self {
            neo4j: Neo4jConfig {
                uri: string("NEO4J_URI", "bolt://localhost:7687"),
                user: string("NEO4J_USER", "neo4j"),
                password: string("NEO4J_PASSWORD", "password"),
                database: string("NEO4J_DATABASE", "neo4j"),
                max_connections: parse_or(&lookup, "NEO4J_MAX_CONNECTIONS", 10),
                fetch_size: parse_or(&lookup, "NEO4J_FETCH_SIZE", 500),
            },
            llm: LlmConfig {
                base_url: string("LLM_BASE_URL", "https://api.hunyuan.cloud.tencent.com/v1"),
                api_key: lookup("LLM_API_KEY").filter(|k| !k.is_empty()),
                model: string("LLM_MODEL", "hunyuan-turbos-latest"),
                timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 60),
                max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", 2000),
            },
            server: ServerConfig {
                host: string("GRAPH_HOST", "0.0.0.0"),
                port: parse_or(&lookup, "GRAPH_PORT", 5000),
            },
            limits: ViewLimits {
                overview_per_type: parse_or(&lookup, "VIEW_OVERVIEW_LIMIT", defaults.overview_per_type),
                grows_in: parse_or(&lookup, "VIEW_GROWS_IN_LIMIT", defaults.grows_in),
                affected_by: parse_or(&lookup, "VIEW_AFFECTED_BY_LIMIT", defaults.affected_by),
                search: parse_or(&lookup, "SEARCH_LIMIT", defaults.search),
                sample: parse_or(&lookup, "SAMPLE_LIMIT", defaults.sample),
            },
        };

        if config.llm.api_key.is_none() {
            tracing::warn!("LLM_API_KEY is not set; question answering will fail at the translate stage");
        }

        config
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable configuration value");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None);

        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.model, "hunyuan-turbos-latest");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.limits, ViewLimits::default());
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("NEO4J_URI", "neo4j+s://example.databases.neo4j.io"),
            ("GRAPH_PORT", "not-a-port"),
            ("SEARCH_LIMIT", " 10 "),
            ("LLM_API_KEY", ""),
        ]));

        assert_eq!(config.neo4j.uri, "neo4j+s://example.databases.neo4j.io");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.limits.search, 10);
        assert!(config.llm.api_key.is_none());
    }
}
