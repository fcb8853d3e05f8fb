// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are within valid ranges and consistent with
//! each other before any loop starts.

use crate::{ConfigError, ConfigResult, HsvRangeConfig, RadarlockConfig, RegionConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    EmptyRegion { field: String },
    EmptyColorRange { field: String },
    FractionOutOfRange { field: String, value: f64 },
    NegativeDuration { field: String, value: f64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRegion { field } => {
                write!(f, "Region {} has zero width or height", field)
            }
            Self::EmptyColorRange { field } => {
                write!(f, "Color range {} has a lower bound above its upper bound", field)
            }
            Self::FractionOutOfRange { field, value } => {
                write!(f, "{} = {} is outside [0, 1]", field, value)
            }
            Self::NegativeDuration { field, value } => {
                write!(f, "{} = {} must be a finite, non-negative number of seconds", field, value)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Non-empty capture regions and color ranges
/// - Thresholds and fractions within [0, 1]
/// - Non-negative durations
/// - Positive geometry and step sizes, consistent marker filter band
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &RadarlockConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_regions(config, &mut errors);
    validate_colors(config, &mut errors);
    validate_fractions(config, &mut errors);
    validate_durations(config, &mut errors);
    validate_geometry(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_regions(config: &RadarlockConfig, errors: &mut Vec<ConfigValidationError>) {
    let regions: [(&str, &RegionConfig); 2] = [
        ("vision.strength_region", &config.vision.strength_region),
        ("vision.button_region", &config.vision.button_region),
    ];
    for (field, region) in regions {
        if region.width == 0 || region.height == 0 {
            errors.push(ConfigValidationError::EmptyRegion {
                field: field.to_string(),
            });
        }
    }
}

fn validate_colors(config: &RadarlockConfig, errors: &mut Vec<ConfigValidationError>) {
    let mut check = |field: String, range: &HsvRangeConfig| {
        if range.is_empty() {
            errors.push(ConfigValidationError::EmptyColorRange { field });
        }
    };

    check("vision.signal_color".to_string(), &config.vision.signal_color);
    check("vision.marker_color".to_string(), &config.vision.marker_color);
    for (i, band) in config.vision.button_bright.iter().enumerate() {
        check(format!("vision.button_bright[{}]", i), band);
    }
    for (i, band) in config.vision.button_dark.iter().enumerate() {
        check(format!("vision.button_dark[{}]", i), band);
    }

    if config.vision.button_bright.is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "vision.button_bright".to_string(),
            reason: "at least one hue band is required".to_string(),
        });
    }
    if config.vision.button_dark.is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "vision.button_dark".to_string(),
            reason: "at least one hue band is required".to_string(),
        });
    }
}

fn validate_fractions(config: &RadarlockConfig, errors: &mut Vec<ConfigValidationError>) {
    let fractions = [
        ("vision.button_pixel_fraction", config.vision.button_pixel_fraction as f64),
        ("radar.wave_threshold", config.radar.wave_threshold as f64),
        ("radar.instant_lock_threshold", config.radar.instant_lock_threshold as f64),
        ("radar.healthy_fraction", config.radar.healthy_fraction as f64),
    ];
    for (field, value) in fractions {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigValidationError::FractionOutOfRange {
                field: field.to_string(),
                value,
            });
        }
    }
}

fn validate_durations(config: &RadarlockConfig, errors: &mut Vec<ConfigValidationError>) {
    let durations = [
        ("vision.collect_confirm_secs", config.vision.collect_confirm_secs),
        ("vision.cycle_period_secs", config.vision.cycle_period_secs),
        ("radar.search_step_delay_secs", config.radar.search_step_delay_secs),
        ("radar.search_window_secs", config.radar.search_window_secs),
        ("radar.signal_timeout_secs", config.radar.signal_timeout_secs),
        ("radar.candidate_settle_secs", config.radar.candidate_settle_secs),
        ("radar.hold_secs", config.radar.hold_secs),
        ("collect.settle_secs", config.collect.settle_secs),
        ("collect.grab_settle_secs", config.collect.grab_settle_secs),
        ("runtime.startup_delay_secs", config.runtime.startup_delay_secs),
    ];
    for (field, value) in durations {
        // Duration::from_secs_f64 panics on negative or non-finite input
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigValidationError::NegativeDuration {
                field: field.to_string(),
                value,
            });
        }
    }
}

fn validate_geometry(config: &RadarlockConfig, errors: &mut Vec<ConfigValidationError>) {
    let radar = &config.radar;
    let vision = &config.vision;

    if radar.radius == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "radar.radius".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if !(radar.search_step_deg > 0.0 && radar.search_step_deg < 360.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "radar.search_step_deg".to_string(),
            reason: format!("{} must be in (0, 360)", radar.search_step_deg),
        });
    }
    if radar.tracking_step_deg <= 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "radar.tracking_step_deg".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if radar.tracking_sweep_deg <= 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "radar.tracking_sweep_deg".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if vision.closing_kernel_width == 0 || vision.closing_kernel_height == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "vision.closing_kernel".to_string(),
            reason: "kernel dimensions must be positive".to_string(),
        });
    }
    if vision.marker_min_area >= vision.marker_max_area {
        errors.push(ConfigValidationError::InvalidValue {
            field: "vision.marker_min_area".to_string(),
            reason: format!(
                "{} must be below marker_max_area {}",
                vision.marker_min_area, vision.marker_max_area
            ),
        });
    }
    if config.runtime.stop_key.trim().is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "runtime.stop_key".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = RadarlockConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_fraction_out_of_range() {
        let mut config = RadarlockConfig::default();
        config.radar.wave_threshold = 1.5;

        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("radar.wave_threshold"));
    }

    #[test]
    fn test_all_problems_are_reported() {
        let mut config = RadarlockConfig::default();
        config.vision.button_region.width = 0;
        config.radar.hold_secs = -1.0;
        config.vision.marker_min_area = 700.0;

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("vision.button_region"));
        assert!(message.contains("radar.hold_secs"));
        assert!(message.contains("vision.marker_min_area"));
    }

    #[test]
    fn test_empty_color_band() {
        let mut config = RadarlockConfig::default();
        config.vision.button_dark[1] = HsvRangeConfig::new([170, 70, 200], [180, 255, 171]);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("vision.button_dark[1]"));
    }
}
