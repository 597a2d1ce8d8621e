use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored GPS sample.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Spot {
    pub spot_id: i64, // bigserial, insertion order only
    pub latd: f64,
    pub longd: f64,
    pub accuracy: f64,
    pub altitude: f64,
    pub speed: f64,
    pub timestamp: i64, // epoch seconds
    pub user_id: String,
}

/// A validated reading as submitted by a device, before it is tagged with
/// its owner and stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotInput {
    pub latd: f64,
    pub longd: f64,
    pub accuracy: f64,
    pub altitude: f64,
    pub speed: f64,
    pub timestamp: i64,
}

/// Wire form of a spot. Every value is text, field names match the RPC
/// parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotRecord {
    pub latd: String,
    pub longd: String,
    pub accuracy: String,
    pub altitude: String,
    pub speed: String,
    pub timestamp: String,
    pub user_id: String,
}

impl From<&Spot> for SpotRecord {
    fn from(spot: &Spot) -> Self {
        Self {
            latd: format_float(spot.latd),
            longd: format_float(spot.longd),
            accuracy: format_float(spot.accuracy),
            altitude: format_float(spot.altitude),
            speed: format_float(spot.speed),
            timestamp: spot.timestamp.to_string(),
            user_id: spot.user_id.clone(),
        }
    }
}

/// Significant digits kept when a float is rendered as text.
const FLOAT_DIGITS: usize = 12;

/// Renders a float as `%.12g` text. Fixed notation gains a trailing `.0`
/// when it has no fractional part, so `10.0` stays `"10.0"`. Exponents
/// carry a sign and at least two digits (`1e+16`, `1e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Rounding to the kept digits first gives the exponent %g decides on.
    let scientific = format!("{:.*e}", FLOAT_DIGITS - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= FLOAT_DIGITS as i32 {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (FLOAT_DIGITS as i32 - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        let trimmed = trim_fraction(&fixed);
        if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            format!("{}.0", trimmed)
        }
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
