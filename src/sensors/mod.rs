//! Sensing pipeline: ultrasonic ranging → median filter → level model.
//!
//! ```text
//! UltrasonicSensor ──(RawSample ×N)──▶ MedianFilter ──(cm)──▶ LevelModel ──▶ FillPercentage
//! ```

pub mod level;
pub mod median;
pub mod ultrasonic;

pub use level::{FillPercentage, LevelModel};
pub use median::{FilteredDistance, MedianFilter};
pub use ultrasonic::{DistanceCm, RawSample, UltrasonicSensor};
