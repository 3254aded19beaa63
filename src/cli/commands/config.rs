//! Implementation of the `embedlike config` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{CommandOutput, output};
use crate::domain::models::config::{Config, DimensionPolicy};
use crate::infrastructure::config::provider::{API_KEY_VARS, BASE_URL_VARS, DUMMY_API_KEY};
use crate::infrastructure::config::{EnvSource, ProcessEnv, ProviderConfig};

#[derive(Args, Debug)]
pub struct ConfigArgs {}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub base_url: String,
    pub credential: &'static str,
    pub default_model: String,
    pub default_dimension: Option<u32>,
    pub max_input_tokens: usize,
    pub timeout_secs: u64,
    pub dimension_policy: DimensionPolicy,
    /// Environment variables consulted for the endpoint and credential
    pub env_sources: Vec<EnvSourceStatus>,
}

#[derive(Debug, Serialize)]
pub struct EnvSourceStatus {
    pub name: &'static str,
    pub set: bool,
}

impl ConfigOutput {
    pub fn from_resolved(provider: &ProviderConfig, env: &dyn EnvSource) -> Self {
        let credential = if provider.api_key == DUMMY_API_KEY {
            "placeholder"
        } else {
            "configured"
        };

        let env_sources = BASE_URL_VARS
            .iter()
            .chain(API_KEY_VARS.iter())
            .map(|&name| EnvSourceStatus {
                name,
                set: env.var(name).is_some_and(|v| !v.trim().is_empty()),
            })
            .collect();

        Self {
            base_url: provider.base_url.clone(),
            credential,
            default_model: provider.default_model.clone(),
            default_dimension: provider.default_dimension,
            max_input_tokens: provider.max_input_tokens,
            timeout_secs: provider.timeout.as_secs(),
            dimension_policy: provider.dimension_policy,
            env_sources,
        }
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Endpoint:          {}", self.base_url),
            format!("Credential:        {}", self.credential),
            format!("Default model:     {}", self.default_model),
            format!(
                "Default dimension: {}",
                self.default_dimension
                    .map_or_else(|| "unset".to_string(), |d| d.to_string())
            ),
            format!("Max input tokens:  {}", self.max_input_tokens),
            format!("Timeout:           {}s", self.timeout_secs),
            format!("Dimension policy:  {:?}", self.dimension_policy),
            "Environment:".to_string(),
        ];
        for source in &self.env_sources {
            lines.push(format!(
                "  {:<22} {}",
                source.name,
                if source.set { "set" } else { "-" }
            ));
        }
        lines.join("\n")
    }
}

pub fn execute(_args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    let provider = ProviderConfig::resolve(&config.embedding, &ProcessEnv);
    output(&ConfigOutput::from_resolved(&provider, &ProcessEnv), json_mode);
    Ok(())
}
