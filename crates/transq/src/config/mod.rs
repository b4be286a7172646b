pub mod defaults;
pub mod loader;
pub mod overlay;

pub use defaults::{EngineMode, GlobalDefaults};
pub use loader::{load_settings, load_settings_from_str, Settings};
pub use overlay::{resolve_field, ConfigOverlay, EffectiveConfig};
