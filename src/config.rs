//! Encoder and decoder settings
//!
//! Plain structs with sensible defaults. `from_env` variants read `QR_*`
//! overrides once per process; nothing is persisted.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

/// Default square edge of generated images, in pixels
pub const DEFAULT_SIZE: u32 = 512;

/// Default quiet zone around the symbol, in modules
pub const DEFAULT_QUIET_ZONE: u32 = 4;

/// Blocks whose luminance range is at or below this are treated as flat
pub const DEFAULT_MIN_DYNAMIC_RANGE: u8 = 24;

/// Largest image edge the encoder will allocate, in pixels
pub const MAX_SIZE: u32 = 4096;

/// Largest accepted quiet zone, in modules
pub const MAX_QUIET_ZONE: u32 = 16;

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn size_setting(raw: Option<&str>) -> u32 {
    parse_or(raw, DEFAULT_SIZE).clamp(1, MAX_SIZE)
}

fn quiet_zone_setting(raw: Option<&str>) -> u32 {
    parse_or(raw, DEFAULT_QUIET_ZONE).min(MAX_QUIET_ZONE)
}

fn ec_level_setting(raw: Option<&str>) -> ErrorCorrection {
    parse_or(raw, ErrorCorrection::default())
}

fn min_contrast_setting(raw: Option<&str>) -> u8 {
    parse_or(raw, DEFAULT_MIN_DYNAMIC_RANGE)
}

static ENV_SIZE: OnceLock<u32> = OnceLock::new();

fn env_size() -> u32 {
    *ENV_SIZE.get_or_init(|| size_setting(env_value("QR_DEFAULT_SIZE").as_deref()))
}

static ENV_QUIET_ZONE: OnceLock<u32> = OnceLock::new();

fn env_quiet_zone() -> u32 {
    *ENV_QUIET_ZONE.get_or_init(|| quiet_zone_setting(env_value("QR_QUIET_ZONE").as_deref()))
}

static ENV_EC_LEVEL: OnceLock<ErrorCorrection> = OnceLock::new();

fn env_ec_level() -> ErrorCorrection {
    *ENV_EC_LEVEL.get_or_init(|| ec_level_setting(env_value("QR_EC_LEVEL").as_deref()))
}

static ENV_MIN_CONTRAST: OnceLock<u8> = OnceLock::new();

fn env_min_contrast() -> u8 {
    *ENV_MIN_CONTRAST.get_or_init(|| min_contrast_setting(env_value("QR_MIN_CONTRAST").as_deref()))
}

/// Error correction level used when encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    /// Low (~7% recovery capacity)
    #[default]
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl ErrorCorrection {
    pub(crate) fn to_ec_level(self) -> qrcode::EcLevel {
        match self {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(ErrorCorrection::L),
            "M" => Ok(ErrorCorrection::M),
            "Q" => Ok(ErrorCorrection::Q),
            "H" => Ok(ErrorCorrection::H),
            other => Err(format!("unknown error correction level '{}' (expected L, M, Q or H)", other)),
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        };
        f.write_str(s)
    }
}

/// Settings for image generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Requested square edge in pixels
    pub size: u32,
    /// White border around the symbol, in modules
    pub quiet_zone: u32,
    /// Error correction level
    pub ec_level: ErrorCorrection,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            quiet_zone: DEFAULT_QUIET_ZONE,
            ec_level: ErrorCorrection::L,
        }
    }
}

impl EncoderConfig {
    /// Defaults overridden by `QR_DEFAULT_SIZE`, `QR_QUIET_ZONE` and `QR_EC_LEVEL`
    pub fn from_env() -> Self {
        Self {
            size: env_size(),
            quiet_zone: env_quiet_zone(),
            ec_level: env_ec_level(),
        }
    }
}

/// Settings for frame decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Minimum luminance spread for a hybrid block to count as textured
    pub min_dynamic_range: u8,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            min_dynamic_range: DEFAULT_MIN_DYNAMIC_RANGE,
        }
    }
}

impl DecoderConfig {
    /// Defaults overridden by `QR_MIN_CONTRAST`
    pub fn from_env() -> Self {
        Self {
            min_dynamic_range: env_min_contrast(),
        }
    }
}

/// Cache directory used for shared images.
///
/// `QR_CACHE_DIR` if set, otherwise `qrmaster` under the system temp dir.
pub fn cache_dir() -> PathBuf {
    std::env::var("QR_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("qrmaster"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ec_level_parses_case_insensitively() {
        assert_eq!("l".parse::<ErrorCorrection>(), Ok(ErrorCorrection::L));
        assert_eq!(" H ".parse::<ErrorCorrection>(), Ok(ErrorCorrection::H));
        assert!("X".parse::<ErrorCorrection>().is_err());
    }

    #[test]
    fn defaults_match_generator_screen() {
        let cfg = EncoderConfig::default();
        assert_eq!(cfg.size, 512);
        assert_eq!(cfg.quiet_zone, 4);
        assert_eq!(cfg.ec_level, ErrorCorrection::L);
        assert_eq!(DecoderConfig::default().min_dynamic_range, 24);
    }

    #[test]
    fn size_override_is_clamped() {
        assert_eq!(size_setting(None), DEFAULT_SIZE);
        assert_eq!(size_setting(Some(" 300 ")), 300);
        assert_eq!(size_setting(Some("0")), 1);
        assert_eq!(size_setting(Some("4294967295")), MAX_SIZE);
        assert_eq!(size_setting(Some("big")), DEFAULT_SIZE);
    }

    #[test]
    fn quiet_zone_override_is_capped() {
        assert_eq!(quiet_zone_setting(None), 4);
        assert_eq!(quiet_zone_setting(Some("0")), 0);
        assert_eq!(quiet_zone_setting(Some("100")), MAX_QUIET_ZONE);
        assert_eq!(quiet_zone_setting(Some("-1")), 4);
    }

    #[test]
    fn ec_and_contrast_overrides_fall_back_on_garbage() {
        assert_eq!(ec_level_setting(Some("q")), ErrorCorrection::Q);
        assert_eq!(ec_level_setting(Some("Z")), ErrorCorrection::L);
        assert_eq!(min_contrast_setting(Some("40")), 40);
        assert_eq!(min_contrast_setting(Some("300")), DEFAULT_MIN_DYNAMIC_RANGE);
    }
}
