use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::layout::Point;
use crate::{tdlog_debug, tdlog_warn, Error, Result};

/// Default hit-test radius in canvas units.
pub const DEFAULT_HIT_RADIUS: f64 = 35.0;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub hit: HitConfig,
}

/// Circle used for default node placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            center_x: 300.0,
            center_y: 300.0,
            radius: 200.0,
        }
    }
}

impl LayoutConfig {
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HitConfig {
    pub radius: f64,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_HIT_RADIUS,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_in(dirs::home_dir().as_deref())
    }

    /// Load `<home>/.taskdag/taskdag.toml`. Without a home directory there is
    /// nothing to read, so the defaults apply.
    pub fn load_in(home: Option<&Path>) -> Result<Self> {
        match home {
            Some(home) => Self::load_from(&home.join(".taskdag").join("taskdag.toml")),
            None => {
                tdlog_warn!("No home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        tdlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            tdlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        tdlog_debug!(
            "Config loaded: center=({}, {}), radius={}, hit_radius={}",
            config.layout.center_x,
            config.layout.center_y,
            config.layout.radius,
            config.hit.radius
        );
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tdlog_debug!("Creating config directory: {}", parent.display());
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        tdlog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        if !(layout.center_x.is_finite() && layout.center_y.is_finite()) {
            return Err(Error::Validation(
                "layout center must be finite".to_string(),
            ));
        }
        if !layout.radius.is_finite() || layout.radius < 0.0 {
            return Err(Error::Validation(format!(
                "layout radius must be a non-negative number, got {}",
                layout.radius
            )));
        }
        if !self.hit.radius.is_finite() || self.hit.radius <= 0.0 {
            return Err(Error::Validation(format!(
                "hit radius must be positive, got {}",
                self.hit.radius
            )));
        }
        Ok(())
    }
}
