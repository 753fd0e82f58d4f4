use serde::{Deserialize, Serialize};

/// The only model the generate endpoint accepts.
pub const DEFAULT_IMAGE_MODEL: &str = "google/gemini-2.5-flash-image";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub category: ModelCategory,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Image,
}

pub fn supported_models() -> Vec<ModelInfo> {
    vec![ModelInfo {
        id: DEFAULT_IMAGE_MODEL.to_string(),
        name: "Gemini 2.5 Flash Image".to_string(),
        provider: "Google".to_string(),
        category: ModelCategory::Image,
        description: "Multimodal model that edits and generates images from a prompt".to_string(),
    }]
}

pub fn is_supported_model(model_id: &str) -> bool {
    supported_models().iter().any(|model| model.id == model_id)
}
