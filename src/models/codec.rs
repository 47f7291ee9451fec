//! Codec between physical parameter values and model-grid string keys.
//!
//! Grid files encode temperatures, densities and radiation fields as
//! mantissa-exponent tokens `"{m}d{e}"` (200 -> `2d2`, 0.1 -> `1d-1`).
//! The mantissa is normalized into [1, 10) and rounded to 12 decimal
//! places to absorb division round-off before formatting; an integral
//! mantissa is printed without a decimal point.

use crate::error::{RrlError, RrlResult};

/// Encodes a positive value as a mantissa-exponent grid key.
pub fn value_to_key(value: f64) -> RrlResult<String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RrlError::InvalidInput(format!(
            "grid keys encode positive finite values, got {value}"
        )));
    }

    let mut exponent = value.log10().floor();
    let mut mantissa = value / f64::powf(10.0, exponent);
    // log10 round-off can leave the mantissa just outside [1, 10).
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1.0;
    }
    if mantissa < 1.0 {
        mantissa *= 10.0;
        exponent -= 1.0;
    }
    mantissa = (mantissa * 1e12).round() / 1e12;
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1.0;
    }

    if mantissa.fract() == 0.0 {
        Ok(format!("{mantissa:.0}d{exponent:.0}"))
    } else {
        Ok(format!("{mantissa}d{exponent:.0}"))
    }
}

/// Decodes a mantissa-exponent grid key back into a value.
pub fn key_to_value(key: &str) -> RrlResult<f64> {
    let (mantissa, exponent) = key.split_once('d').ok_or_else(|| {
        RrlError::InvalidInput(format!("grid key `{key}` lacks a `d` separator"))
    })?;
    let mantissa: f64 = mantissa.parse().map_err(|_| {
        RrlError::InvalidInput(format!("grid key `{key}` has a malformed mantissa"))
    })?;
    let exponent: f64 = exponent.parse().map_err(|_| {
        RrlError::InvalidInput(format!("grid key `{key}` has a malformed exponent"))
    })?;

    Ok(mantissa * f64::powf(10.0, exponent))
}

/// Decodes a grid key, mapping any malformed key to 0.
///
/// Compatibility quirk of the historical grid tooling, preserved only at
/// this boundary; new code should prefer the strict [`key_to_value`].
pub fn key_to_value_lenient(key: &str) -> f64 {
    key_to_value(key).unwrap_or(0.0)
}

/// Finds the index of the value closest to `target`.
///
/// With a tolerance, a closest value further away than the tolerance is
/// an error instead of being silently accepted. Ties resolve to the
/// first occurrence; the values need not be sorted.
pub fn best_match_index(target: f64, values: &[f64], tolerance: Option<f64>) -> RrlResult<usize> {
    if values.is_empty() {
        return Err(RrlError::InvalidInput(
            "cannot search an empty value sequence".to_string(),
        ));
    }

    let mut index = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if f64::abs(value - target) < f64::abs(values[index] - target) {
            index = i;
        }
    }

    if let Some(tolerance) = tolerance {
        let closest = values[index];
        if f64::abs(closest - target) > tolerance {
            return Err(RrlError::NoMatch {
                target,
                tolerance,
                closest,
            });
        }
    }
    Ok(index)
}
