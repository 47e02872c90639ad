//! Boss templates
//!
//! A template describes one variant of the arena boss: its display name and
//! how its boss bar looks. Templates are loaded from a directory of JSON
//! files by [`loader::JsonTemplateSource`].

pub mod loader;

use serde::{Deserialize, Serialize};

pub use loader::{JsonTemplateSource, StaticTemplateSource, TemplateError, TemplateSource};

/// Boss bar colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarColor {
    #[default]
    Pink,
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    White,
}

/// Boss bar segmentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarStyle {
    #[default]
    Solid,
    Segmented6,
    Segmented10,
    Segmented12,
    Segmented20,
}

/// One boss variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossTemplate {
    /// Taken from the file name, not the file body
    #[serde(skip)]
    pub identifier: String,
    /// Display name shown above the boss and on the boss bar
    pub name: String,
    #[serde(default = "default_spawn_weight")]
    pub spawn_weight: f64,
    #[serde(default)]
    pub bar_color: BarColor,
    #[serde(default)]
    pub bar_style: BarStyle,
}

fn default_spawn_weight() -> f64 {
    1.0
}

impl BossTemplate {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            spawn_weight: default_spawn_weight(),
            bar_color: BarColor::default(),
            bar_style: BarStyle::default(),
        }
    }
}
