//! Embedding domain models
//!
//! Per-call request units and the small value types shared by the
//! provider port and its adapters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Operational stage a caller asks a provider to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingStage {
    /// Plain embedding generation
    #[default]
    Base,
    /// Second-pass reranking
    Rerank,
}

impl fmt::Display for EmbeddingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Rerank => write!(f, "rerank"),
        }
    }
}

/// Text payload of a task: one string or an ordered batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<String>),
}

impl EmbeddingInput {
    /// Flatten into the ordered list sent upstream.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            Self::Single(text) => vec![text],
            Self::Batch(texts) => texts,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(texts) => texts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Caller-supplied keyword parameters for a single call.
///
/// `model` and `dimensions` are interpreted by the adapter. Everything in
/// `extra` is forwarded to the server untouched, except the keys the
/// adapter owns (see [`ADAPTER_KEYS`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// `Some(NaN)` is a supplied-but-invalid value and counts as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<f64>,

    #[serde(default, flatten)]
    extra: Map<String, Value>,
}

/// Request keys set by the adapter itself; never forwarded from extras.
pub const ADAPTER_KEYS: [&str; 3] = ["model", "dimensions", "input"];

impl EmbeddingOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_dimensions(mut self, dimensions: f64) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Add a pass-through parameter. `input`, `model` and `dimensions` are
    /// owned by the adapter and routed to their typed fields instead.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        match key.as_str() {
            "model" => self.model = value.as_str().map(str::to_string),
            "dimensions" => self.dimensions = Some(value.as_f64().unwrap_or(f64::NAN)),
            "input" => {
                tracing::debug!("ignoring `input` override; texts are supplied separately");
            }
            _ => {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// Pass-through parameters forwarded to the server.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Split into model, dimensions and pass-through extras.
    ///
    /// Adapter-owned keys that arrived in `extra` through deserialization
    /// are routed as [`Self::with_param`] routes them; typed fields win.
    pub fn into_parts(mut self) -> (Option<String>, Option<f64>, Map<String, Value>) {
        let mut routed = Self::default();
        for key in ADAPTER_KEYS {
            if let Some(value) = self.extra.remove(key) {
                routed = routed.with_param(key, value);
            }
        }
        (
            self.model.or(routed.model),
            self.dimensions.or(routed.dimensions),
            self.extra,
        )
    }
}

/// Interpret a raw dimensionality value.
///
/// Anything that is not a finite, positive whole number is treated as
/// absent rather than rejected.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn valid_dimension(raw: f64) -> Option<u32> {
    if !raw.is_finite() || raw < 1.0 || raw.fract() != 0.0 || raw > f64::from(u32::MAX) {
        return None;
    }
    Some(raw as u32)
}

/// A request unit: texts, stage and per-call overrides.
///
/// Built per call and dropped once the call completes.
#[derive(Debug, Clone)]
pub struct EmbeddingTask {
    pub input: EmbeddingInput,
    pub stage: EmbeddingStage,
    pub overrides: EmbeddingOverrides,
}

impl EmbeddingTask {
    pub fn single(text: impl Into<String>, stage: EmbeddingStage, overrides: EmbeddingOverrides) -> Self {
        Self {
            input: EmbeddingInput::Single(text.into()),
            stage,
            overrides,
        }
    }

    pub fn batch(texts: Vec<String>, stage: EmbeddingStage, overrides: EmbeddingOverrides) -> Self {
        Self {
            input: EmbeddingInput::Batch(texts),
            stage,
            overrides,
        }
    }
}

/// A retrieved chunk as handed to `rerank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub id: String,
    pub document_id: String,
    pub text: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Value,
}

impl ChunkSearchResult {
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: f32) -> Self {
        let id = id.into();
        Self {
            document_id: id.clone(),
            id,
            text: text.into(),
            score,
            metadata: Value::Null,
        }
    }
}
