use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::models::spot::SpotInput;

pub const METHOD: &str = "method";
pub const USER_ID: &str = "user_id";
pub const SPOT_COUNT: &str = "spotCount";
pub const LAT: &str = "latd";
pub const LNG: &str = "longd";
pub const ACCURACY: &str = "accuracy";
pub const ALTITUDE: &str = "altitude";
pub const SPEED: &str = "speed";
pub const TIME: &str = "timestamp";
pub const PRIVACY: &str = "privacy";

/// Form parameters of one RPC call, query string first, then the body.
/// Only the first occurrence of a key is kept.
#[derive(Debug, Default)]
pub struct RpcParams {
    values: HashMap<String, String>,
}

impl RpcParams {
    pub fn parse(query: Option<&str>, body: &[u8]) -> Result<Self> {
        let query_pairs: Vec<(String, String)> = match query {
            Some(query) => serde_urlencoded::from_str(query)
                .map_err(|e| AppError::Validation(format!("malformed query string: {}", e)))?,
            None => Vec::new(),
        };
        let body_pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| AppError::Validation(format!("malformed form body: {}", e)))?;

        let mut values = HashMap::with_capacity(query_pairs.len() + body_pairs.len());
        for (key, value) in query_pairs.into_iter().chain(body_pairs) {
            values.entry(key).or_insert(value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn required(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| AppError::Validation(format!("missing parameter '{}'", key)))
    }

    pub fn float(&self, key: &str) -> Result<f64> {
        let raw = self.required(key)?;
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(AppError::Validation(format!(
                "parameter '{}' is not a number: '{}'",
                key, raw
            ))),
        }
    }

    pub fn integer<T: FromStr>(&self, key: &str) -> Result<T> {
        let raw = self.required(key)?;
        raw.trim().parse::<T>().map_err(|_| {
            AppError::Validation(format!("parameter '{}' is not an integer: '{}'", key, raw))
        })
    }

    /// Reads the reading at `index` from the `latd{i}`, `longd{i}`, ...
    /// parameters.
    pub fn spot(&self, index: usize) -> Result<SpotInput> {
        Ok(SpotInput {
            latd: self.float(&format!("{}{}", LAT, index))?,
            longd: self.float(&format!("{}{}", LNG, index))?,
            accuracy: self.float(&format!("{}{}", ACCURACY, index))?,
            altitude: self.float(&format!("{}{}", ALTITUDE, index))?,
            speed: self.float(&format!("{}{}", SPEED, index))?,
            timestamp: self.integer(&format!("{}{}", TIME, index))?,
        })
    }

    /// Reads and validates the whole batch announced by `spotCount`.
    pub fn spots(&self) -> Result<Vec<SpotInput>> {
        let count: usize = self.integer(SPOT_COUNT)?;
        (0..count).map(|i| self.spot(i)).collect()
    }
}
