use serde::{Deserialize, Serialize};

/// Which naming convention the translation engine uses for its outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Outputs are named `<stem>_<modelName>.<ext>`.
    #[default]
    Standard,
    /// Outputs are named `<stem>_translated.<ext>`.
    Pipeline,
}

/// Application-wide translation parameters.
///
/// Every queue item falls back to these values, field by field, unless its
/// overlay provides its own. The value is immutable once loaded and is passed
/// explicitly to whoever resolves an item's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDefaults {
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default = "default_ctx_size")]
    pub ctx_size: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_gpu_layers")]
    pub gpu_layers: i32,
    #[serde(default = "default_rep_penalty_base")]
    pub rep_penalty_base: f32,
    #[serde(default = "default_rep_penalty_max")]
    pub rep_penalty_max: f32,
    #[serde(default = "default_kv_cache_type")]
    pub kv_cache_type: String,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub alignment_mode: bool,
    #[serde(default)]
    pub save_cot: bool,
    #[serde(default)]
    pub pre_rule_profile: Option<String>,
    #[serde(default)]
    pub post_rule_profile: Option<String>,
    /// `None` writes outputs next to their source file.
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub glossary_path: Option<String>,
    /// `None` writes cache files next to their output file.
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default)]
    pub engine_mode: EngineMode,
}

fn default_ctx_size() -> u32 {
    4096
}

fn default_concurrency() -> u32 {
    1
}

fn default_temperature() -> f32 {
    0.7
}

fn default_gpu_layers() -> i32 {
    -1
}

fn default_rep_penalty_base() -> f32 {
    1.0
}

fn default_rep_penalty_max() -> f32 {
    1.5
}

fn default_kv_cache_type() -> String {
    "f16".to_string()
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            model_path: None,
            ctx_size: default_ctx_size(),
            concurrency: default_concurrency(),
            temperature: default_temperature(),
            gpu_layers: default_gpu_layers(),
            rep_penalty_base: default_rep_penalty_base(),
            rep_penalty_max: default_rep_penalty_max(),
            kv_cache_type: default_kv_cache_type(),
            seed: None,
            alignment_mode: false,
            save_cot: false,
            pre_rule_profile: None,
            post_rule_profile: None,
            output_dir: None,
            glossary_path: None,
            cache_dir: None,
            engine_mode: EngineMode::default(),
        }
    }
}
