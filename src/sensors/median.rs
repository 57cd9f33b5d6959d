//! Median filter over one sampling round.
//!
//! Ultrasonic rangers throw sporadic spikes from turbulence and side
//! echoes.  The median discards them without needing a noise model.
//!
//! ## Round policy
//!
//! - Failed pings (timeouts, pin faults) are excluded from the set.
//! - The round fails with [`SensorError::InsufficientData`] when more than
//!   half the pings failed (`valid * 2 < iterations`).
//! - An even number of valid readings yields the mean of the two middle
//!   values.

use heapless::Vec;
use log::debug;

use crate::app::ports::RangingPort;
use crate::config::MAX_MEDIAN_ITERATIONS;
use crate::error::{ConfigError, SensorError};

/// Median distance of one round, plus how many pings contributed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilteredDistance {
    pub cm: f32,
    pub valid_samples: u8,
}

pub struct MedianFilter {
    iterations: usize,
}

impl MedianFilter {
    pub fn new(iterations: usize) -> Result<Self, ConfigError> {
        if !(1..=MAX_MEDIAN_ITERATIONS).contains(&iterations) {
            return Err(ConfigError::InvalidSampling("iterations must be 1–32"));
        }
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Run one round of `iterations` pings and reduce it to its median.
    pub fn sample(&self, sampler: &mut impl RangingPort) -> Result<FilteredDistance, SensorError> {
        let mut readings: Vec<f32, MAX_MEDIAN_ITERATIONS> = Vec::new();
        let mut failed = 0usize;

        for _ in 0..self.iterations {
            match sampler.measure_once() {
                Ok(raw) => {
                    // Capacity equals the iteration bound checked in new().
                    let _ = readings.push(raw.to_distance().0);
                }
                Err(_) => failed += 1,
            }
        }

        let valid = readings.len();
        if valid * 2 < self.iterations {
            debug!("median: {failed}/{} pings failed, round rejected", self.iterations);
            return Err(SensorError::InsufficientData {
                valid: valid as u8,
                iterations: self.iterations as u8,
            });
        }

        let cm = median(&mut readings).ok_or(SensorError::InsufficientData {
            valid: 0,
            iterations: self.iterations as u8,
        })?;
        Ok(FilteredDistance { cm, valid_samples: valid as u8 })
    }
}

/// Median of `values` (sorted in place).  `None` for an empty slice.
pub fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}
