//! Per-item configuration layered over [`GlobalDefaults`].
//!
//! Resolution is field-granular: an unset field falls back to the global
//! value on its own. The single exception is `use_global_defaults`, which
//! makes the item ignore every overlay field.

use serde::{Deserialize, Serialize};

use crate::config::defaults::{EngineMode, GlobalDefaults};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverlay {
    #[serde(default = "default_true")]
    pub use_global_defaults: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctx_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_layers: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_penalty_base: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep_penalty_max: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kv_cache_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_cot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_rule_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_rule_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_mode: Option<EngineMode>,
}

fn default_true() -> bool {
    true
}

impl Default for ConfigOverlay {
    fn default() -> Self {
        Self::follow_global()
    }
}

impl ConfigOverlay {
    /// The reset state: every field discarded, the global defaults in charge.
    pub fn follow_global() -> Self {
        Self {
            use_global_defaults: true,
            model_path: None,
            ctx_size: None,
            concurrency: None,
            temperature: None,
            gpu_layers: None,
            rep_penalty_base: None,
            rep_penalty_max: None,
            kv_cache_type: None,
            seed: None,
            alignment_mode: None,
            save_cot: None,
            pre_rule_profile: None,
            post_rule_profile: None,
            output_dir: None,
            glossary_path: None,
            cache_dir: None,
            engine_mode: None,
        }
    }

    /// An empty overlay that opts out of the global escape hatch, so that
    /// fields set on it afterwards take effect.
    pub fn custom() -> Self {
        Self {
            use_global_defaults: false,
            ..Self::follow_global()
        }
    }

    /// Returns true if no field is set, whatever the flag says.
    pub fn is_empty(&self) -> bool {
        *self
            == Self {
                use_global_defaults: self.use_global_defaults,
                ..Self::follow_global()
            }
    }

    /// Resolves every field against `defaults`.
    pub fn resolve(&self, defaults: &GlobalDefaults) -> EffectiveConfig {
        EffectiveConfig {
            model_path: resolve_field(self, defaults.model_path.clone(), |o| {
                o.model_path.clone().map(Some)
            }),
            ctx_size: resolve_field(self, defaults.ctx_size, |o| o.ctx_size),
            concurrency: resolve_field(self, defaults.concurrency, |o| o.concurrency),
            temperature: resolve_field(self, defaults.temperature, |o| o.temperature),
            gpu_layers: resolve_field(self, defaults.gpu_layers, |o| o.gpu_layers),
            rep_penalty_base: resolve_field(self, defaults.rep_penalty_base, |o| {
                o.rep_penalty_base
            }),
            rep_penalty_max: resolve_field(self, defaults.rep_penalty_max, |o| o.rep_penalty_max),
            kv_cache_type: resolve_field(self, defaults.kv_cache_type.clone(), |o| {
                o.kv_cache_type.clone()
            }),
            seed: resolve_field(self, defaults.seed, |o| o.seed.map(Some)),
            alignment_mode: resolve_field(self, defaults.alignment_mode, |o| o.alignment_mode),
            save_cot: resolve_field(self, defaults.save_cot, |o| o.save_cot),
            pre_rule_profile: resolve_field(self, defaults.pre_rule_profile.clone(), |o| {
                o.pre_rule_profile.clone().map(Some)
            }),
            post_rule_profile: resolve_field(self, defaults.post_rule_profile.clone(), |o| {
                o.post_rule_profile.clone().map(Some)
            }),
            output_dir: resolve_field(self, defaults.output_dir.clone(), |o| {
                o.output_dir.clone().map(Some)
            }),
            glossary_path: resolve_field(self, defaults.glossary_path.clone(), |o| {
                o.glossary_path.clone().map(Some)
            }),
            cache_dir: resolve_field(self, defaults.cache_dir.clone(), |o| {
                o.cache_dir.clone().map(Some)
            }),
            engine_mode: resolve_field(self, defaults.engine_mode, |o| o.engine_mode),
        }
    }
}

/// Picks the value a consumer should use for one field.
///
/// Returns `global` when the overlay follows the global defaults or leaves
/// the field unset, the overlay's own value otherwise.
pub fn resolve_field<T>(
    overlay: &ConfigOverlay,
    global: T,
    field: impl FnOnce(&ConfigOverlay) -> Option<T>,
) -> T {
    if overlay.use_global_defaults {
        return global;
    }
    field(overlay).unwrap_or(global)
}

/// The fully resolved parameter set for one queue item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub model_path: Option<String>,
    pub ctx_size: u32,
    pub concurrency: u32,
    pub temperature: f32,
    pub gpu_layers: i32,
    pub rep_penalty_base: f32,
    pub rep_penalty_max: f32,
    pub kv_cache_type: String,
    pub seed: Option<i64>,
    pub alignment_mode: bool,
    pub save_cot: bool,
    pub pre_rule_profile: Option<String>,
    pub post_rule_profile: Option<String>,
    pub output_dir: Option<String>,
    pub glossary_path: Option<String>,
    pub cache_dir: Option<String>,
    pub engine_mode: EngineMode,
}
