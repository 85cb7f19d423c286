use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Force and cooling constants for the layout simulation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub link_distance: f32,
    pub link_strength: f32,
    pub charge_strength: f32,
    pub charge_distance_min: f32,
    pub charge_distance_max: f32,
    pub barnes_hut_theta: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub initial_alpha: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
    pub resize_alpha: f32,
    pub seed_radius_fraction: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 620.0,
            link_strength: 0.25,
            charge_strength: -2200.0,
            charge_distance_min: 120.0,
            charge_distance_max: 1400.0,
            barnes_hut_theta: 0.9,
            collision_padding: 80.0,
            collision_strength: 1.0,
            initial_alpha: 0.6,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            resize_alpha: 0.15,
            seed_radius_fraction: 0.45 * 1.45,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid layout config {}", path.display()))
    }

    pub fn with_overrides(
        mut self,
        link_distance: Option<f32>,
        charge_strength: Option<f32>,
        collision_padding: Option<f32>,
    ) -> Self {
        if let Some(value) = link_distance {
            self.link_distance = value.max(1.0);
        }
        if let Some(value) = charge_strength {
            self.charge_strength = value;
        }
        if let Some(value) = collision_padding {
            self.collision_padding = value.max(0.0);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"link_distance": 300.0}"#).expect("valid config");

        assert_eq!(config.link_distance, 300.0);
        assert_eq!(config.charge_strength, -2200.0);
        assert_eq!(config.collision_padding, 80.0);
    }

    #[test]
    fn default_decay_reaches_alpha_min_in_about_300_ticks() {
        let config = LayoutConfig::default();
        let mut alpha = 1.0_f32;
        for _ in 0..300 {
            alpha += -alpha * config.alpha_decay;
        }
        assert!((alpha - config.alpha_min).abs() < 1e-4);
    }

    #[test]
    fn overrides_are_clamped() {
        let config = LayoutConfig::default().with_overrides(Some(-5.0), None, Some(-1.0));
        assert_eq!(config.link_distance, 1.0);
        assert_eq!(config.collision_padding, 0.0);
        assert_eq!(config.charge_strength, -2200.0);
    }
}
