use std::env;

use crate::engine::distance::DistanceConfig;
use crate::error::AppError;
use crate::geo::EARTH_RADIUS_KM;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub distance: DistanceConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let defaults = DistanceConfig::default();
        let distance = DistanceConfig {
            earth_radius_km: parse_or_default("EARTH_RADIUS_KM", EARTH_RADIUS_KM)?,
            max_speed_kmh: parse_or_default("MAX_SPEED_KMH", defaults.max_speed_kmh)?,
            jump_threshold_km: parse_or_default("JUMP_THRESHOLD_KM", defaults.jump_threshold_km)?,
        };
        validate_distance(&distance)?;

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("LOG_FORMAT")
                .is_ok_and(|format| format.eq_ignore_ascii_case("json")),
            distance,
        })
    }
}

pub fn validate_distance(distance: &DistanceConfig) -> Result<(), AppError> {
    if !distance.earth_radius_km.is_finite() || distance.earth_radius_km <= 0.0 {
        return Err(AppError::Internal(
            "invalid EARTH_RADIUS_KM: must be a positive number".to_string(),
        ));
    }

    if !distance.max_speed_kmh.is_finite() || distance.max_speed_kmh < 0.0 {
        return Err(AppError::Internal(
            "invalid MAX_SPEED_KMH: must be a non-negative number".to_string(),
        ));
    }

    if !distance.jump_threshold_km.is_finite() || distance.jump_threshold_km < 0.0 {
        return Err(AppError::Internal(
            "invalid JUMP_THRESHOLD_KM: must be a non-negative number".to_string(),
        ));
    }

    Ok(())
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_distance;
    use crate::engine::distance::DistanceConfig;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_distance(&DistanceConfig::default()).is_ok());
    }

    #[test]
    fn zero_speed_is_allowed() {
        let config = DistanceConfig {
            max_speed_kmh: 0.0,
            ..DistanceConfig::default()
        };
        assert!(validate_distance(&config).is_ok());
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let config = DistanceConfig {
            earth_radius_km: 0.0,
            ..DistanceConfig::default()
        };
        assert!(validate_distance(&config).is_err());
    }

    #[test]
    fn nan_threshold_is_rejected() {
        let config = DistanceConfig {
            jump_threshold_km: f64::NAN,
            ..DistanceConfig::default()
        };
        assert!(validate_distance(&config).is_err());
    }
}
