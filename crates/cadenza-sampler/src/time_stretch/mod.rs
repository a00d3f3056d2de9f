//! Time-stretching and pitch-scaling of reader chains.
//!
//! [`TimeStretchPitchScaleReader`] drives any [`StretchEngine`]; the
//! built-in [`GranularStretcher`] needs no external DSP library.
//!
//! # Example
//!
//! ```ignore
//! use cadenza_sampler::{GranularStretcher, TimeStretchParams, TimeStretchPitchScaleReader};
//!
//! let specs = source.specs();
//! let engine = GranularStretcher::new(specs.channels as usize, specs.rate);
//!
//! // Half speed, one octave up
//! let params = TimeStretchParams::new().with_time_ratio(2.0).with_pitch_scale(2.0);
//! let mut stretched = TimeStretchPitchScaleReader::new(source, Box::new(engine), params)?;
//! ```

mod engine;
mod granular;
mod params;
mod reader;

pub use engine::StretchEngine;
pub use granular::{GrainSize, GranularConfig, GranularStretcher};
pub use params::TimeStretchParams;
pub use reader::TimeStretchPitchScaleReader;
