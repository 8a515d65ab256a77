//! Per-sample derived metrics and small aggregation helpers

use crate::attribution::LabeledSample;

/// Counters for rows the pipeline dropped while computing a report
///
/// Data-quality problems never abort a report; they are counted here and
/// logged once per partition so the offending input can be found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataQuality {
    /// Sample pairs with a negative time delta (out of order after dedup)
    pub out_of_order_pairs: usize,
    /// Samples outside every sector interval
    pub outside_samples: usize,
    /// Laps excluded from segmentation
    pub skipped_laps: usize,
}

impl DataQuality {
    pub fn is_clean(&self) -> bool {
        *self == DataQuality::default()
    }
}

/// Instantaneous acceleration per sample, aligned with the input.
///
/// For consecutive samples, acceleration in m/s^2 is
/// `((speed_curr - speed_prev) / 3.6) / dt` with dt in seconds and speeds
/// in km/h. The first sample has no predecessor and yields None. A zero
/// time delta yields exactly 0.0. A negative delta is a data-quality error:
/// the pair is skipped (None) and counted, never computed.
pub fn instantaneous_accelerations(samples: &[LabeledSample]) -> (Vec<Option<f64>>, usize) {
    let mut values = Vec::with_capacity(samples.len());
    let mut out_of_order = 0;

    for (i, sample) in samples.iter().enumerate() {
        if i == 0 {
            values.push(None);
            continue;
        }

        let prev = &samples[i - 1];
        let dt = (sample.date.timestamp_micros() - prev.date.timestamp_micros()) as f64 / 1e6;

        if dt > 0.0 {
            values.push(Some(((sample.speed - prev.speed) / 3.6) / dt));
        } else if dt == 0.0 {
            values.push(Some(0.0));
        } else {
            out_of_order += 1;
            values.push(None);
        }
    }

    (values, out_of_order)
}

/// Arithmetic mean; None for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
