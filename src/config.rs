use std::f64::consts::FRAC_PI_2;

use glam::DVec3;

/// Every tunable the viewer reads at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,

    // Camera
    pub start_position: DVec3,
    pub start_theta: f64,
    pub start_phi: f64,
    pub key_step: f64,
    pub look_sensitivity: f64,

    // Raymarch bounds, written once
    pub min_dist: f32,
    pub max_dist: f32,

    /// Ticks per frame-rate measurement window
    pub fps_window: u32,

    /// Shader locations: URLs on wasm, directory on native
    pub vertex_shader: String,
    pub fragment_shader: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            start_position: DVec3::new(0.0, 0.0, -50.0),
            start_theta: FRAC_PI_2,
            start_phi: FRAC_PI_2,
            key_step: 0.1,
            look_sensitivity: 1.0 / 50_000.0,
            min_dist: 0.0,
            max_dist: 2000.0,
            fps_window: 100,
            vertex_shader: default_shader_path("vertex.wgsl"),
            fragment_shader: default_shader_path("fragment.wgsl"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn default_shader_path(file: &str) -> String {
    format!("shaders/{file}")
}

#[cfg(not(target_arch = "wasm32"))]
fn default_shader_path(file: &str) -> String {
    format!("{}/shaders/{file}", env!("CARGO_MANIFEST_DIR"))
}

#[cfg(not(target_arch = "wasm32"))]
impl ViewerConfig {
    /// Defaults with `BULBVIEW_WIDTH`, `BULBVIEW_HEIGHT` and `BULBVIEW_SHADER_DIR` applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(w) = parse_dimension("BULBVIEW_WIDTH", lookup("BULBVIEW_WIDTH")) {
            self.width = w;
        }
        if let Some(h) = parse_dimension("BULBVIEW_HEIGHT", lookup("BULBVIEW_HEIGHT")) {
            self.height = h;
        }
        if let Some(dir) = lookup("BULBVIEW_SHADER_DIR") {
            let dir = dir.trim_end_matches('/');
            self.vertex_shader = format!("{dir}/vertex.wgsl");
            self.fragment_shader = format!("{dir}/fragment.wgsl");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_dimension(key: &str, value: Option<String>) -> Option<u32> {
    let raw = value?;
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            tracing::warn!("ignoring {key}={raw:?}: expected a positive integer");
            None
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overridden(vars: &[(&str, &str)]) -> ViewerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = ViewerConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned());
        config
    }

    #[test]
    fn defaults_match_startup_scene() {
        let config = ViewerConfig::default();
        assert_eq!(config.start_position, DVec3::new(0.0, 0.0, -50.0));
        assert_eq!(config.start_theta, FRAC_PI_2);
        assert_eq!(config.start_phi, FRAC_PI_2);
        assert_eq!(config.key_step, 0.1);
        assert_eq!(config.fps_window, 100);
        assert_eq!(config.max_dist, 2000.0);
        assert!(config.vertex_shader.ends_with("shaders/vertex.wgsl"));
    }

    #[test]
    fn env_overrides_size_and_shader_dir() {
        let config = overridden(&[
            ("BULBVIEW_WIDTH", "1280"),
            ("BULBVIEW_HEIGHT", " 720 "),
            ("BULBVIEW_SHADER_DIR", "/tmp/bulb/"),
        ]);
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.vertex_shader, "/tmp/bulb/vertex.wgsl");
        assert_eq!(config.fragment_shader, "/tmp/bulb/fragment.wgsl");
    }

    #[test]
    fn bad_dimensions_are_ignored() {
        let config = overridden(&[("BULBVIEW_WIDTH", "wide"), ("BULBVIEW_HEIGHT", "0")]);
        assert_eq!((config.width, config.height), (800, 600));
    }
}
