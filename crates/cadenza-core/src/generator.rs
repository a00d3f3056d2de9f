//! Infinite signal sources.

use crate::error::Result;
use crate::reader::{ReadStatus, Reader};
use crate::specs::Specs;
use std::f64::consts::TAU;

/// Endless silence in any channel layout.
#[derive(Debug, Clone)]
pub struct SilenceReader {
    specs: Specs,
    position: i64,
}

impl SilenceReader {
    pub fn new(specs: Specs) -> Self {
        Self { specs, position: 0 }
    }
}

impl Reader for SilenceReader {
    fn specs(&self) -> Specs {
        self.specs
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn length(&self) -> i64 {
        -1
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn seek(&mut self, position: i64) {
        self.position = position.max(0);
    }

    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
        buffer[..length * self.specs.samples_per_frame()].fill(0.0);
        self.position += length as i64;
        Ok(ReadStatus::full(length))
    }
}

/// Endless mono sine wave at full scale.
#[derive(Debug, Clone)]
pub struct SineReader {
    frequency: f64,
    rate: f64,
    position: i64,
}

impl SineReader {
    pub fn new(frequency: f64, rate: f64) -> Self {
        Self {
            frequency,
            rate,
            position: 0,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }
}

impl Reader for SineReader {
    fn specs(&self) -> Specs {
        Specs::mono(self.rate)
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn length(&self) -> i64 {
        -1
    }

    fn position(&self) -> i64 {
        self.position
    }

    fn seek(&mut self, position: i64) {
        self.position = position.max(0);
    }

    fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
        let step = TAU * self.frequency / self.rate;
        for (i, sample) in buffer[..length].iter_mut().enumerate() {
            *sample = ((self.position + i as i64) as f64 * step).sin() as f32;
        }
        self.position += length as i64;
        Ok(ReadStatus::full(length))
    }
}
