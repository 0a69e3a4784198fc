//! Training project records as delivered by the project list endpoint.

use serde::{Deserialize, Serialize};

/// A training project. Projects flagged as prediction modules are the models
/// a cascade can use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProject {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_prediction_module: bool,
    /// Whether the project has a trained model ready for inference.
    #[serde(default)]
    pub is_trained: bool,
}

impl TrainingProject {
    pub fn new(id: u64, name: &str, is_prediction_module: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            is_prediction_module,
            is_trained: false,
        }
    }
}
