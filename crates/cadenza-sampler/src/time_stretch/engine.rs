//! Block-oriented stretch engine contract.

/// A planar, block-oriented time-stretch / pitch-scale engine.
///
/// The engine buffers internally: callers feed input until
/// [`available`](Self::available) reports output, then retrieve it. All
/// buffers are planar, one slice per channel.
pub trait StretchEngine: Send {
    fn channels(&self) -> usize;

    /// Append `count` frames from each channel slice. `finished` marks the
    /// last input; the engine then flushes everything it holds.
    fn feed(&mut self, input: &[&[f32]], count: usize, finished: bool);

    /// Input frames needed before more output can be produced.
    fn samples_required(&self) -> usize;

    /// Frames ready to retrieve, or -1 once finished and fully drained.
    fn available(&self) -> i64;

    /// Move up to `count` frames into the channel slices; returns the
    /// number moved.
    fn retrieve(&mut self, output: &mut [&mut [f32]], count: usize) -> usize;

    /// Drop all buffered input and output.
    fn reset(&mut self);

    /// Silent input frames to feed after a reset for aligned output.
    fn preferred_start_pad(&self) -> usize;

    /// Output frames to discard after feeding the start pad.
    fn start_delay(&self) -> usize;

    fn set_time_ratio(&mut self, ratio: f64);

    fn set_pitch_scale(&mut self, scale: f64);
}
