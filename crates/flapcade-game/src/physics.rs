//! Physics constants for the playfield.

use std::time::Duration;

use tracing::warn;

/// Playfield geometry and physics, in per-tick units.
///
/// One tick is meant to be one display frame, so `gravity` and
/// `obstacle_speed` are "per frame". Only obstacle spawning is measured in
/// simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    pub width: f64,
    pub height: f64,
    /// Height of the ground band at the bottom of the field.
    pub ground_height: f64,
    pub subject_x: f64,
    pub subject_start_y: f64,
    pub subject_radius: f64,
    pub gravity: f64,
    /// Velocity a flap sets (negative is up).
    pub flap_impulse: f64,
    pub obstacle_width: f64,
    /// Vertical size of the opening in each obstacle.
    pub obstacle_gap: f64,
    pub obstacle_speed: f64,
    pub spawn_interval: Duration,
    /// Smallest allowed top edge of a gap.
    pub gap_min_top: f64,
    /// Minimum distance between a gap's bottom edge and the field bottom.
    pub gap_bottom_margin: f64,
    /// How far past the left edge an obstacle's trailing edge travels
    /// before it is dropped.
    pub cull_margin: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            ground_height: 20.0,
            subject_x: 100.0,
            subject_start_y: 300.0,
            subject_radius: 20.0,
            gravity: 0.4,
            flap_impulse: -8.0,
            obstacle_width: 80.0,
            obstacle_gap: 250.0,
            obstacle_speed: 2.0,
            spawn_interval: Duration::from_millis(3000),
            gap_min_top: 80.0,
            gap_bottom_margin: 100.0,
            cull_margin: 50.0,
        }
    }
}

impl PhysicsConfig {
    /// Replaces unusable values (non-finite, negative sizes, a gap taller
    /// than the field) with the defaults.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let mut cfg = self;

        macro_rules! positive {
            ($($field:ident),*) => {$(
                if !(cfg.$field.is_finite() && cfg.$field > 0.0) {
                    warn!(field = stringify!($field), value = cfg.$field, "invalid physics value, using default");
                    cfg.$field = defaults.$field;
                }
            )*};
        }
        positive!(
            width,
            height,
            subject_radius,
            obstacle_width,
            obstacle_gap,
            obstacle_speed
        );

        macro_rules! finite {
            ($($field:ident),*) => {$(
                if !cfg.$field.is_finite() {
                    warn!(field = stringify!($field), "non-finite physics value, using default");
                    cfg.$field = defaults.$field;
                }
            )*};
        }
        finite!(
            ground_height,
            subject_x,
            subject_start_y,
            gravity,
            flap_impulse,
            gap_min_top,
            gap_bottom_margin,
            cull_margin
        );

        if cfg.obstacle_gap >= cfg.height {
            warn!(
                gap = cfg.obstacle_gap,
                height = cfg.height,
                "obstacle gap taller than field, using default"
            );
            cfg.obstacle_gap = defaults.obstacle_gap.min(cfg.height / 2.0);
        }
        if cfg.spawn_interval.is_zero() {
            cfg.spawn_interval = defaults.spawn_interval;
        }
        cfg
    }

    /// Y coordinate of the ground surface.
    pub fn floor(&self) -> f64 {
        self.height - self.ground_height
    }

    /// Half-open range `[low, high)` that a gap's top edge is sampled
    /// from. Collapses to `[low, low]` when the field is too small.
    pub fn gap_top_range(&self) -> (f64, f64) {
        let low = self.gap_min_top;
        let high = self.height - self.obstacle_gap - self.gap_bottom_margin;
        (low, high.max(low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gap_top_range() {
        let cfg = PhysicsConfig::default();
        assert_eq!(cfg.gap_top_range(), (80.0, 250.0));
        assert_eq!(cfg.floor(), 580.0);
    }

    #[test]
    fn test_validated_replaces_bad_values() {
        let cfg = PhysicsConfig {
            width: -1.0,
            gravity: f64::NAN,
            obstacle_gap: 10_000.0,
            spawn_interval: Duration::ZERO,
            ..Default::default()
        }
        .validated();
        assert_eq!(cfg.width, 800.0);
        assert_eq!(cfg.gravity, 0.4);
        assert_eq!(cfg.obstacle_gap, 250.0);
        assert_eq!(cfg.spawn_interval, Duration::from_millis(3000));
    }

    #[test]
    fn test_gap_top_range_collapses_on_tiny_field() {
        let cfg = PhysicsConfig {
            height: 300.0,
            ..Default::default()
        };
        assert_eq!(cfg.gap_top_range(), (80.0, 80.0));
    }
}
