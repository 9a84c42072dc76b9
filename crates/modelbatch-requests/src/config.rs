//! Batch configuration and model seeding options.

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};

pub const ENV_TOKEN: &str = "MODELBATCH_TOKEN";
pub const ENV_MODEL_ID: &str = "MODELBATCH_MODEL_ID";
pub const ENV_ID_PREFIX: &str = "MODELBATCH_ID_PREFIX";

/// Settings a [`RequestSet`](crate::RequestSet) starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Opaque session token carried with the batch.
    pub token: Option<String>,
    /// Model id back-filled into requests that name none.
    pub model_id: Option<String>,
    /// When set, placeholders are `prefix-1`, `prefix-2`, ... instead of UUIDs.
    pub id_prefix: Option<String>,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `MODELBATCH_TOKEN`, `MODELBATCH_MODEL_ID` and
    /// `MODELBATCH_ID_PREFIX`. Unset or empty variables are left as `None`.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            token: var(ENV_TOKEN),
            model_id: var(ENV_MODEL_ID),
            id_prefix: var(ENV_ID_PREFIX),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BatchError::Config(e.to_string()))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }
}

/// Seeding parameters for a new model. Absent keys are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSeed {
    /// Class to build the new model around.
    #[serde(rename = "class-id", default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    /// Background species.
    #[serde(rename = "taxon-id", default, skip_serializing_if = "Option::is_none")]
    pub taxon_id: Option<String>,
}

impl ModelSeed {
    pub const CLASS_ID: &'static str = "class-id";
    pub const TAXON_ID: &'static str = "taxon-id";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn with_taxon(mut self, taxon_id: impl Into<String>) -> Self {
        self.taxon_id = Some(taxon_id.into());
        self
    }

    /// Present keys in wire order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(class_id) = &self.class_id {
            out.push((Self::CLASS_ID, class_id.as_str()));
        }
        if let Some(taxon_id) = &self.taxon_id {
            out.push((Self::TAXON_ID, taxon_id.as_str()));
        }
        out
    }
}
