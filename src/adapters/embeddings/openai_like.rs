//! OpenAI-compatible embedding provider adapter.
//!
//! Talks to any server exposing the OpenAI `/embeddings` endpoint (OpenAI,
//! LM Studio, vLLM, text-embeddings-inference, llama.cpp server). Unlike a
//! strict OpenAI client it does not validate model names or dimensions,
//! falls back to a placeholder credential, truncates oversized inputs and
//! retries once without `dimensions` when a server rejects it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{debug, error, info, warn};

use super::fallback::retry_parameters;
use super::wire::{EmbeddingParameters, EmbeddingsRequest, decode_response};
use crate::domain::errors::{EmbeddingError, EmbeddingResult};
use crate::domain::models::config::{DimensionPolicy, EmbeddingSettings};
use crate::domain::models::embedding::{
    ChunkSearchResult, EmbeddingOverrides, EmbeddingStage, EmbeddingTask, valid_dimension,
};
use crate::domain::ports::embedding::{BlockingEmbeddingProvider, EmbeddingProvider};
use crate::infrastructure::config::{EnvSource, ProviderConfig};
use crate::infrastructure::tokenizer::TiktokenCounter;
use crate::services::token_budget::{TokenCounter, truncate_to_limit};

/// Embedding provider for OpenAI-compatible servers.
///
/// Shareable across concurrent calls. The only mutable state is the
/// tokenizer cache for override models.
pub struct OpenAiLikeEmbeddingProvider {
    config: ProviderConfig,
    client: reqwest::Client,
    /// Created on first blocking call; building or dropping it inside a
    /// tokio runtime panics.
    blocking_client: OnceLock<reqwest::blocking::Client>,
    /// Precise counter for the default model, when tiktoken knows it.
    token_counter: Option<Arc<dyn TokenCounter>>,
    override_counters: RwLock<HashMap<String, Option<Arc<dyn TokenCounter>>>>,
}

impl OpenAiLikeEmbeddingProvider {
    pub fn new(config: ProviderConfig) -> EmbeddingResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let token_counter = load_counter(&config.default_model);

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            max_input_tokens = config.max_input_tokens,
            dimension_policy = ?config.dimension_policy,
            "Initialized OpenAI-like embedding provider"
        );

        Ok(Self {
            config,
            client,
            blocking_client: OnceLock::new(),
            token_counter,
            override_counters: RwLock::new(HashMap::new()),
        })
    }

    /// Resolve `settings` against `env` and construct the provider.
    pub fn from_settings(settings: &EmbeddingSettings, env: &dyn EnvSource) -> EmbeddingResult<Self> {
        Self::new(ProviderConfig::resolve(settings, env))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Merge per-call overrides over the provider defaults.
    ///
    /// A supplied `dimensions` override replaces the default even when it
    /// is invalid, in which case no dimension is used at all.
    pub fn build_request_parameters(&self, overrides: EmbeddingOverrides) -> EmbeddingParameters {
        let (model, dimensions, extra) = overrides.into_parts();

        let model = model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.config.default_model.clone());

        let dimensions = match dimensions {
            Some(raw) => valid_dimension(raw),
            None => self.config.default_dimension,
        };

        self.apply_dimension_policy(EmbeddingParameters {
            model,
            dimensions,
            extra,
        })
    }

    fn apply_dimension_policy(&self, params: EmbeddingParameters) -> EmbeddingParameters {
        match self.config.dimension_policy {
            DimensionPolicy::Omit => params.without_dimensions(),
            DimensionPolicy::IncludeWhenValid => params,
        }
    }

    /// Counter for `model`; tokenizers for override models are loaded once
    /// and kept, including the "unknown model" outcome.
    fn counter_for(&self, model: &str) -> Option<Arc<dyn TokenCounter>> {
        if model == self.config.default_model {
            return self.token_counter.clone();
        }

        if let Some(cached) = self
            .override_counters
            .read()
            .ok()
            .and_then(|counters| counters.get(model).cloned())
        {
            return cached;
        }

        let counter = load_counter(model);
        if let Ok(mut counters) = self.override_counters.write() {
            counters.insert(model.to_string(), counter.clone());
        }
        counter
    }

    /// Truncate inputs and finalize parameters for dispatch.
    fn prepare(
        &self,
        texts: Vec<String>,
        params: EmbeddingParameters,
    ) -> (Vec<String>, EmbeddingParameters) {
        let params = self.apply_dimension_policy(params.normalized());
        let counter = self.counter_for(&params.model);
        let texts = truncate_to_limit(texts, self.config.max_input_tokens, counter.as_deref());
        (texts, params)
    }

    /// Embed `texts` with `params`, retrying once without `dimensions` if
    /// the server rejects it.
    pub async fn execute_embedding_request(
        &self,
        texts: Vec<String>,
        params: EmbeddingParameters,
    ) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let (texts, params) = self.prepare(texts, params);

        let message = match self.post(&texts, &params).await {
            Ok(vectors) => return Ok(vectors),
            Err(message) => message,
        };

        let Some(retry) = retry_parameters(&params, &message) else {
            return Err(terminal(EmbeddingError::AsyncRequest(message)));
        };

        warn!(
            model = %retry.model,
            error = %message,
            "Embedding server rejected `dimensions`; retrying without it"
        );
        self.post(&texts, &retry)
            .await
            .map_err(|message| terminal(EmbeddingError::AsyncRequest(message)))
    }

    /// Blocking variant of [`Self::execute_embedding_request`].
    pub fn execute_embedding_request_blocking(
        &self,
        texts: Vec<String>,
        params: EmbeddingParameters,
    ) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let client = self.blocking_client()?;
        let (texts, params) = self.prepare(texts, params);

        let message = match self.post_blocking(client, &texts, &params) {
            Ok(vectors) => return Ok(vectors),
            Err(message) => message,
        };

        let Some(retry) = retry_parameters(&params, &message) else {
            return Err(terminal(EmbeddingError::Request(message)));
        };

        warn!(
            model = %retry.model,
            error = %message,
            "Embedding server rejected `dimensions`; retrying without it"
        );
        self.post_blocking(client, &texts, &retry)
            .map_err(|message| terminal(EmbeddingError::Request(message)))
    }

    /// Run a full task: stage check, parameter merge, request.
    pub async fn execute_task(&self, task: EmbeddingTask) -> EmbeddingResult<Vec<Vec<f32>>> {
        ensure_base_stage(task.stage)?;
        let params = self.build_request_parameters(task.overrides);
        self.execute_embedding_request(task.input.into_texts(), params)
            .await
    }

    pub fn execute_task_blocking(&self, task: EmbeddingTask) -> EmbeddingResult<Vec<Vec<f32>>> {
        ensure_base_stage(task.stage)?;
        let params = self.build_request_parameters(task.overrides);
        self.execute_embedding_request_blocking(task.input.into_texts(), params)
    }

    async fn post(
        &self,
        texts: &[String],
        params: &EmbeddingParameters,
    ) -> Result<Vec<Vec<f32>>, String> {
        debug!(
            url = %self.config.embeddings_url(),
            model = %params.model,
            inputs = texts.len(),
            dimensions = ?params.dimensions,
            "sending embedding request"
        );

        let response = self
            .client
            .post(self.config.embeddings_url())
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingsRequest {
                input: texts,
                params,
            })
            .send()
            .await
            .map_err(|e| format!("Embedding API request failed: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read embedding response: {e}"))?;

        decode_response(status, &body, texts.len())
    }

    fn post_blocking(
        &self,
        client: &reqwest::blocking::Client,
        texts: &[String],
        params: &EmbeddingParameters,
    ) -> Result<Vec<Vec<f32>>, String> {
        debug!(
            url = %self.config.embeddings_url(),
            model = %params.model,
            inputs = texts.len(),
            dimensions = ?params.dimensions,
            "sending blocking embedding request"
        );

        let response = client
            .post(self.config.embeddings_url())
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingsRequest {
                input: texts,
                params,
            })
            .send()
            .map_err(|e| format!("Embedding API request failed: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| format!("Failed to read embedding response: {e}"))?;

        decode_response(status, &body, texts.len())
    }

    fn blocking_client(&self) -> EmbeddingResult<&reqwest::blocking::Client> {
        if let Some(client) = self.blocking_client.get() {
            return Ok(client);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| {
                EmbeddingError::Configuration(format!("Failed to build blocking HTTP client: {e}"))
            })?;
        Ok(self.blocking_client.get_or_init(|| client))
    }
}

fn load_counter(model: &str) -> Option<Arc<dyn TokenCounter>> {
    match TiktokenCounter::for_model(model) {
        Ok(counter) => Some(Arc::new(counter)),
        Err(err) => {
            debug!(model, error = %err, "using heuristic token estimates");
            None
        }
    }
}

fn ensure_base_stage(stage: EmbeddingStage) -> EmbeddingResult<()> {
    match stage {
        EmbeddingStage::Base => Ok(()),
        other => Err(EmbeddingError::UnsupportedStage(other)),
    }
}

fn terminal(err: EmbeddingError) -> EmbeddingError {
    error!(error = %err, "embedding request failed");
    err
}

fn first_vector(vectors: Vec<Vec<f32>>) -> Vec<f32> {
    // Count is checked against the input during decoding.
    vectors.into_iter().next().unwrap_or_default()
}

fn pass_through(results: Vec<ChunkSearchResult>, limit: usize) -> Vec<ChunkSearchResult> {
    results.into_iter().take(limit).collect()
}

#[async_trait]
impl EmbeddingProvider for OpenAiLikeEmbeddingProvider {
    fn name(&self) -> &'static str {
        "openai_like"
    }

    async fn get_embedding(
        &self,
        text: &str,
        stage: EmbeddingStage,
        overrides: EmbeddingOverrides,
    ) -> EmbeddingResult<Vec<f32>> {
        self.execute_task(EmbeddingTask::single(text, stage, overrides))
            .await
            .map(first_vector)
    }

    async fn get_embeddings(
        &self,
        texts: &[String],
        stage: EmbeddingStage,
        overrides: EmbeddingOverrides,
    ) -> EmbeddingResult<Vec<Vec<f32>>> {
        self.execute_task(EmbeddingTask::batch(texts.to_vec(), stage, overrides))
            .await
    }

    async fn rerank(
        &self,
        _query: &str,
        results: Vec<ChunkSearchResult>,
        _stage: EmbeddingStage,
        limit: usize,
    ) -> Vec<ChunkSearchResult> {
        pass_through(results, limit)
    }
}

impl BlockingEmbeddingProvider for OpenAiLikeEmbeddingProvider {
    fn get_embedding_blocking(
        &self,
        text: &str,
        stage: EmbeddingStage,
        overrides: EmbeddingOverrides,
    ) -> EmbeddingResult<Vec<f32>> {
        self.execute_task_blocking(EmbeddingTask::single(text, stage, overrides))
            .map(first_vector)
    }

    fn get_embeddings_blocking(
        &self,
        texts: &[String],
        stage: EmbeddingStage,
        overrides: EmbeddingOverrides,
    ) -> EmbeddingResult<Vec<Vec<f32>>> {
        self.execute_task_blocking(EmbeddingTask::batch(texts.to_vec(), stage, overrides))
    }

    fn rerank_blocking(
        &self,
        _query: &str,
        results: Vec<ChunkSearchResult>,
        _stage: EmbeddingStage,
        limit: usize,
    ) -> Vec<ChunkSearchResult> {
        pass_through(results, limit)
    }
}
