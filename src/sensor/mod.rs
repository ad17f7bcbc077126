//! # Motion sensor sampling.
//!
//! - [`MotionInput`] capability trait for the binary input, [`FileInput`] for sysfs GPIO
//! - [`EdgeDetector`] rising-edge detection with a fixed debounce window
//! - [`MotionEvent`] what an accepted edge produces

mod detector;
mod input;

pub use detector::{EdgeDetector, MotionEvent, SensorState};
pub use input::{FileInput, MotionInput};
