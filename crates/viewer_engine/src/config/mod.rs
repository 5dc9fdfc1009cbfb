//! Configuration system
//!
//! All tunables for the progressive-rendering core live here: frame-budget
//! bounds, ground-pass pacing, and progressive-mode switches. Configs load
//! from TOML or RON by file extension and validate before use.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Semantic validation failure
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// # Frame Budget Configuration
///
/// Bounds for the adaptive per-tick CPU budget. The controller nudges the
/// target by one millisecond per tick and never leaves [min, max].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameBudgetConfig {
    /// Initial per-tick draw budget in milliseconds
    pub target_frame_time_ms: f64,
    /// Hard floor for the adaptive budget
    pub min_frame_time_ms: f64,
    /// Hard ceiling for the adaptive budget
    pub max_frame_time_ms: f64,
    /// Double all three bounds at startup for low-power/mobile targets
    pub low_power: bool,
}

impl FrameBudgetConfig {
    /// Create a budget configuration with desktop defaults (30 Hz target)
    pub fn new() -> Self {
        Self {
            target_frame_time_ms: 1000.0 / 30.0,
            min_frame_time_ms: 1000.0 / 60.0,
            max_frame_time_ms: 1000.0 / 15.0,
            low_power: false,
        }
    }

    /// Enable low-power mode (doubles every bound at construction time)
    pub fn with_low_power(mut self, enabled: bool) -> Self {
        self.low_power = enabled;
        self
    }

    /// Bounds with the low-power doubling applied
    ///
    /// Returns (target, min, max) in milliseconds. This is a static choice
    /// made once at startup, not a runtime adaptation.
    pub fn effective_bounds(&self) -> (f64, f64, f64) {
        let factor = if self.low_power { 2.0 } else { 1.0 };
        (
            self.target_frame_time_ms * factor,
            self.min_frame_time_ms * factor,
            self.max_frame_time_ms * factor,
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_frame_time_ms <= 0.0 {
            return Err(ConfigError::Invalid(
                "min_frame_time_ms must be positive".to_string(),
            ));
        }
        if self.min_frame_time_ms > self.max_frame_time_ms {
            return Err(ConfigError::Invalid(format!(
                "min_frame_time_ms ({}) exceeds max_frame_time_ms ({})",
                self.min_frame_time_ms, self.max_frame_time_ms
            )));
        }
        if self.target_frame_time_ms < self.min_frame_time_ms
            || self.target_frame_time_ms > self.max_frame_time_ms
        {
            return Err(ConfigError::Invalid(format!(
                "target_frame_time_ms ({}) outside [{}, {}]",
                self.target_frame_time_ms, self.min_frame_time_ms, self.max_frame_time_ms
            )));
        }
        Ok(())
    }
}

impl Default for FrameBudgetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Ground Pass Configuration
///
/// Pacing for the incremental ground shadow and reflection builds. A full
/// pass over N batches must complete within `max_process_frames` ticks, with
/// a floor of `min_batches_per_frame` batches per tick so small scenes
/// finish near-instantly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundPassConfig {
    /// Ceiling on the number of ticks a full ground pass may take
    pub max_process_frames: usize,
    /// Floor on batches processed per tick
    pub min_batches_per_frame: usize,
    /// Whether the ground shadow pass runs at all
    pub shadow_enabled: bool,
    /// Whether the ground reflection pass runs at all
    pub reflection_enabled: bool,
}

impl GroundPassConfig {
    /// Create a ground-pass configuration with defaults
    pub fn new() -> Self {
        Self {
            max_process_frames: 10,
            min_batches_per_frame: 10,
            shadow_enabled: true,
            reflection_enabled: false,
        }
    }

    /// Enable or disable the shadow pass
    pub fn with_shadow(mut self, enabled: bool) -> Self {
        self.shadow_enabled = enabled;
        self
    }

    /// Enable or disable the reflection pass
    pub fn with_reflection(mut self, enabled: bool) -> Self {
        self.reflection_enabled = enabled;
        self
    }

    /// Batches to process per tick for a pass over `total_batches` batches
    pub fn batches_per_frame(&self, total_batches: usize) -> usize {
        total_batches
            .div_ceil(self.max_process_frames.max(1))
            .max(self.min_batches_per_frame)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_process_frames == 0 {
            return Err(ConfigError::Invalid(
                "max_process_frames must be at least 1".to_string(),
            ));
        }
        if self.min_batches_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "min_batches_per_frame must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GroundPassConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Progressive Rendering Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressiveConfig {
    /// Spread scene draws across ticks under the frame budget; when false,
    /// every redraw drains the whole queue in one tick
    pub enabled: bool,
    /// Draw hidden geometry ghosted after the normal pass
    pub ghosting_enabled: bool,
}

impl ProgressiveConfig {
    /// Create a progressive configuration with defaults
    pub fn new() -> Self {
        Self {
            enabled: true,
            ghosting_enabled: true,
        }
    }

    /// Enable or disable progressive rendering
    pub fn with_progressive(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enable or disable the ghosted pass
    pub fn with_ghosting(mut self, enabled: bool) -> Self {
        self.ghosting_enabled = enabled;
        self
    }
}

impl Default for ProgressiveConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Viewer Configuration
///
/// Top-level configuration for the viewer core. Applications load this from
/// a file or build it with the `with_*` methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Adaptive frame-budget bounds
    pub frame: FrameBudgetConfig,
    /// Ground shadow/reflection pacing
    pub ground: GroundPassConfig,
    /// Progressive-mode switches
    pub progressive: ProgressiveConfig,
    /// Log level for the viewer
    pub log_level: String,
}

impl ViewerConfig {
    /// Create a viewer configuration with defaults
    pub fn new() -> Self {
        Self {
            frame: FrameBudgetConfig::default(),
            ground: GroundPassConfig::default(),
            progressive: ProgressiveConfig::default(),
            log_level: "info".to_string(),
        }
    }

    /// Replace the frame-budget configuration
    pub fn with_frame(mut self, frame: FrameBudgetConfig) -> Self {
        self.frame = frame;
        self
    }

    /// Replace the ground-pass configuration
    pub fn with_ground(mut self, ground: GroundPassConfig) -> Self {
        self.ground = ground;
        self
    }

    /// Replace the progressive configuration
    pub fn with_progressive(mut self, progressive: ProgressiveConfig) -> Self {
        self.progressive = progressive;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frame.validate()?;
        self.ground.validate()?;
        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_low_power_doubles_bounds() {
        let config = FrameBudgetConfig::new().with_low_power(true);
        let (target, min, max) = config.effective_bounds();
        assert_relative_eq!(target, 2000.0 / 30.0, epsilon = 1e-9);
        assert_relative_eq!(min, 2000.0 / 60.0, epsilon = 1e-9);
        assert_relative_eq!(max, 2000.0 / 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = FrameBudgetConfig::new();
        config.min_frame_time_ms = 100.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_batches_per_frame_floor_and_ceiling() {
        let config = GroundPassConfig::new();
        // 95 batches over at most 10 frames, floor of 10 => 10 per frame
        assert_eq!(config.batches_per_frame(95), 10);
        // Small scenes hit the floor
        assert_eq!(config.batches_per_frame(3), 10);
        // Large scenes split across the frame ceiling
        assert_eq!(config.batches_per_frame(1000), 100);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ViewerConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ViewerConfig = toml::from_str(&text).unwrap();
        assert_relative_eq!(
            parsed.frame.target_frame_time_ms,
            config.frame.target_frame_time_ms
        );
        assert_eq!(parsed.ground.max_process_frames, 10);
    }
}
