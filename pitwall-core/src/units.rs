//! Type-safe wrappers for reported quantities
//!
//! Newtype wrappers around f64 for the metric columns of report rows.
//! Reported aggregates carry a fixed-precision display contract: all unit
//! types serialize rounded to 2 decimal places. The underlying value is
//! untouched; only the serialized form is rounded.

use serde::{Deserialize, Serialize};

/// Round f64 to 2 decimal places for report output
fn round2<S: serde::Serializer>(val: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((*val * 100.0).round() / 100.0)
}

/// Kilometers per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct KilometersPerHour(#[serde(serialize_with = "round2")] pub f64);

/// Meters per second squared (acceleration)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MetersPerSecondSquared(#[serde(serialize_with = "round2")] pub f64);

/// Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Celsius(#[serde(serialize_with = "round2")] pub f64);

/// Percentage (0-100)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Percent(#[serde(serialize_with = "round2")] pub f64);

/// Seconds (durations)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Seconds(#[serde(serialize_with = "round2")] pub f64);
