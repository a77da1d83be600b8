use crate::CONFY_APP_NAME;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// sRGB, 0xRRGGBB.
    pub background: u32,
    pub show_grid: bool,
    pub show_skeleton: bool,
    pub show_mesh: bool,
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            background: 0x202020,
            show_grid: true,
            show_skeleton: true,
            show_mesh: true,
            fov: 75.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

impl DisplaySettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "display").unwrap_or_else(|e| {
            log::warn!("display settings unreadable, using defaults: {e}");
            Self::default()
        })
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "display", self) {
            log::warn!("failed to save display settings: {e}");
        }
    }

    /// Background as linear RGB, for the clear colour of an sRGB surface.
    pub fn background_linear(&self) -> [f64; 3] {
        let channel = |shift: u32| srgb_to_linear(((self.background >> shift) & 0xff) as f64 / 255.0);
        [channel(16), channel(8), channel(0)]
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSettings {
    /// Directory that relative asset paths are resolved against.
    pub asset_root: PathBuf,
    /// When set, assets are fetched over HTTP from here instead of disk.
    pub base_url: Option<String>,
    /// Key whose asset is shown at start-up.
    pub initial_key: char,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            base_url: None,
            initial_key: '1',
        }
    }
}

impl AssetSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "assets").unwrap_or_else(|e| {
            log::warn!("asset settings unreadable, using defaults: {e}");
            Self::default()
        })
    }
}

pub struct Settings {
    pub display: DisplaySettings,
    pub assets: AssetSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            display: DisplaySettings::load(),
            assets: AssetSettings::load(),
        }
    }
}
