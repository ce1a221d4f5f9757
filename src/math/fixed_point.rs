//! Two's-complement fixed-point decoding and the saturating logistic map.
//!
//! All functions here are pure and may be called from any thread.

use anyhow::{Result, bail};
use thiserror::Error;

/// Decoded reals above this value map to exactly 1.0, below its negation to 0.0.
pub const SATURATION_LIMIT: f64 = 5.0;

pub const DEFAULT_DATA_WIDTH: u32 = 16;
pub const DEFAULT_FRAC_BITS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("empty token")]
    Empty,
    #[error("'{0}' is not a hexadecimal value")]
    NotHex(String),
    #[error("'{token}' does not fit in {width} bits")]
    TooWide { token: String, width: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointFormat {
    pub data_width: u32,
    pub frac_bits: u32,
}

impl Default for FixedPointFormat {
    fn default() -> Self {
        Self {
            data_width: DEFAULT_DATA_WIDTH,
            frac_bits: DEFAULT_FRAC_BITS,
        }
    }
}

impl FixedPointFormat {
    pub fn new(data_width: u32, frac_bits: u32) -> Result<Self> {
        let format = Self {
            data_width,
            frac_bits,
        };
        format.validate()?;
        Ok(format)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_width == 0 || self.data_width > 32 {
            bail!("data width must be in 1..=32 (got {})", self.data_width);
        }
        if self.frac_bits >= self.data_width {
            bail!(
                "fractional bits ({}) must be smaller than data width ({})",
                self.frac_bits,
                self.data_width
            );
        }
        Ok(())
    }

    fn mask(&self) -> u64 {
        (1u64 << self.data_width) - 1
    }

    /// Interprets the low `data_width` bits of `bits` as a two's-complement value.
    pub fn sign_extend(&self, bits: u64) -> i64 {
        let bits = bits & self.mask();
        let sign_bit = 1u64 << (self.data_width - 1);
        if bits & sign_bit != 0 {
            bits as i64 - (1i64 << self.data_width)
        } else {
            bits as i64
        }
    }

    pub fn decode(&self, raw: i64) -> f64 {
        raw as f64 / (1u64 << self.frac_bits) as f64
    }

    /// Parses one hex token (optional `0x` prefix) into a sign-extended raw value.
    pub fn parse_token(&self, token: &str) -> Result<i64, TokenError> {
        let trimmed = token.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(if trimmed.is_empty() {
                TokenError::Empty
            } else {
                TokenError::NotHex(trimmed.to_string())
            });
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TokenError::NotHex(trimmed.to_string()));
        }
        let bits = u64::from_str_radix(digits, 16).map_err(|_| TokenError::TooWide {
            token: trimmed.to_string(),
            width: self.data_width,
        })?;
        if bits > self.mask() {
            return Err(TokenError::TooWide {
                token: trimmed.to_string(),
                width: self.data_width,
            });
        }
        Ok(self.sign_extend(bits))
    }

    pub fn raw_to_probability(&self, raw: i64) -> f64 {
        to_probability(self.decode(raw))
    }
}

/// Saturating logistic transform.
pub fn to_probability(real: f64) -> f64 {
    if real > SATURATION_LIMIT {
        1.0
    } else if real < -SATURATION_LIMIT {
        0.0
    } else {
        1.0 / (1.0 + (-real).exp())
    }
}
