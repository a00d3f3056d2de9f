//! Sample format conversion engine.
//!
//! One stateless kernel per (source, target) encoding pair, each converting
//! exactly `samples` scalar samples. Channel layout is the caller's concern.
//!
//! ## In-place safety
//!
//! Every kernel may run with target and source pointing at the same memory.
//! Kernels that widen the encoding walk from the highest index down, so a
//! write never lands on source bytes that have not been read yet. Kernels
//! that narrow (or keep) the width walk upwards.
//!
//! ## Rounding
//!
//! Integer narrowing truncates. Float input at or beyond ±1.0 saturates to
//! the integer range. Each kernel keeps its own arithmetic (for example
//! integer to f64 paths divide in single precision first) so results are
//! bit-for-bit reproducible; do not unify them.

use crate::specs::SampleFormat;
use std::ptr;

/// Zero point of unsigned 8-bit samples.
pub const U8_ZERO: u8 = 0x80;
pub const S16_MAX: i16 = i16::MAX;
pub const S16_MIN: i16 = i16::MIN;
/// 16-bit full scale used when converting to float.
pub const S16_FLT: f32 = 32767.0;
pub const S32_MAX: i32 = i32::MAX;
pub const S32_MIN: i32 = i32::MIN;
/// 32-bit full scale used when converting to float.
pub const S32_FLT: f32 = 2147483647.0;
pub const FLT_MAX: f32 = 1.0;
pub const FLT_MIN: f32 = -1.0;

const BIG_ENDIAN: bool = cfg!(target_endian = "big");

type Kernel = unsafe fn(*mut u8, *const u8, usize);

#[inline(always)]
unsafe fn ld<T: Copy>(p: *const u8, i: usize) -> T {
    ptr::read_unaligned((p as *const T).add(i))
}

#[inline(always)]
unsafe fn st<T>(p: *mut u8, i: usize, value: T) {
    ptr::write_unaligned((p as *mut T).add(i), value)
}

/// Packed 24-bit sample, returned left-aligned in an i32.
#[inline(always)]
unsafe fn ld_s24_be(p: *const u8, i: usize) -> i32 {
    let b = p.add(i * 3);
    ((*b as u32) << 24 | (*b.add(1) as u32) << 16 | (*b.add(2) as u32) << 8) as i32
}

#[inline(always)]
unsafe fn ld_s24_le(p: *const u8, i: usize) -> i32 {
    let b = p.add(i * 3);
    ((*b.add(2) as u32) << 24 | (*b.add(1) as u32) << 16 | (*b as u32) << 8) as i32
}

/// Stores the upper three bytes of a left-aligned i32.
#[inline(always)]
unsafe fn st_s24_be(p: *mut u8, i: usize, value: i32) {
    let b = p.add(i * 3);
    *b = (value >> 24) as u8;
    *b.add(1) = (value >> 16) as u8;
    *b.add(2) = (value >> 8) as u8;
}

#[inline(always)]
unsafe fn st_s24_le(p: *mut u8, i: usize, value: i32) {
    let b = p.add(i * 3);
    *b.add(2) = (value >> 24) as u8;
    *b.add(1) = (value >> 16) as u8;
    *b = (value >> 8) as u8;
}

/// Defines a kernel. `widen` iterates high-to-low, `narrow` low-to-high.
macro_rules! kernel {
    ($name:ident, widen, |$t:ident, $s:ident, $i:ident| $body:expr) => {
        unsafe fn $name($t: *mut u8, $s: *const u8, n: usize) {
            for $i in (0..n).rev() {
                $body;
            }
        }
    };
    ($name:ident, narrow, |$t:ident, $s:ident, $i:ident| $body:expr) => {
        unsafe fn $name($t: *mut u8, $s: *const u8, n: usize) {
            for $i in 0..n {
                $body;
            }
        }
    };
}

unsafe fn copy<const N: usize>(t: *mut u8, s: *const u8, n: usize) {
    if t as *const u8 != s {
        ptr::copy(s, t, n * N);
    }
}

// u8 ->
kernel!(u8_s16, widen, |t, s, i| st::<i16>(t, i, ((ld::<u8>(s, i) as i16) - U8_ZERO as i16) << 8));
kernel!(u8_s24_be, widen, |t, s, i| {
    let v = ld::<u8>(s, i).wrapping_sub(U8_ZERO);
    *t.add(i * 3) = v;
    *t.add(i * 3 + 1) = 0;
    *t.add(i * 3 + 2) = 0;
});
kernel!(u8_s24_le, widen, |t, s, i| {
    let v = ld::<u8>(s, i).wrapping_sub(U8_ZERO);
    *t.add(i * 3 + 2) = v;
    *t.add(i * 3 + 1) = 0;
    *t.add(i * 3) = 0;
});
kernel!(u8_s32, widen, |t, s, i| st::<i32>(t, i, ((ld::<u8>(s, i) as i32) - U8_ZERO as i32) << 24));
kernel!(u8_float, widen, |t, s, i| st::<f32>(
    t,
    i,
    ((ld::<u8>(s, i) as i32) - U8_ZERO as i32) as f32 / U8_ZERO as f32
));
kernel!(u8_double, widen, |t, s, i| st::<f64>(
    t,
    i,
    ((ld::<u8>(s, i) as i32) - U8_ZERO as i32) as f64 / U8_ZERO as f64
));

// s16 ->
kernel!(s16_u8, narrow, |t, s, i| st::<u8>(t, i, ((ld::<i16>(s, i) >> 8) + U8_ZERO as i16) as u8));
kernel!(s16_s24_be, widen, |t, s, i| {
    let v = ld::<i16>(s, i);
    *t.add(i * 3) = (v >> 8) as u8;
    *t.add(i * 3 + 1) = v as u8;
    *t.add(i * 3 + 2) = 0;
});
kernel!(s16_s24_le, widen, |t, s, i| {
    let v = ld::<i16>(s, i);
    *t.add(i * 3 + 2) = (v >> 8) as u8;
    *t.add(i * 3 + 1) = v as u8;
    *t.add(i * 3) = 0;
});
kernel!(s16_s32, widen, |t, s, i| st::<i32>(t, i, (ld::<i16>(s, i) as i32) << 16));
kernel!(s16_float, widen, |t, s, i| st::<f32>(t, i, ld::<i16>(s, i) as f32 / S16_FLT));
kernel!(s16_double, widen, |t, s, i| st::<f64>(t, i, (ld::<i16>(s, i) as f32 / S16_FLT) as f64));

// s24 ->
kernel!(s24_u8_be, narrow, |t, s, i| st::<u8>(t, i, ((ld_s24_be(s, i) >> 24) as u8) ^ U8_ZERO));
kernel!(s24_u8_le, narrow, |t, s, i| st::<u8>(t, i, ((ld_s24_le(s, i) >> 24) as u8) ^ U8_ZERO));
kernel!(s24_s16_be, narrow, |t, s, i| st::<i16>(t, i, (ld_s24_be(s, i) >> 16) as i16));
kernel!(s24_s16_le, narrow, |t, s, i| st::<i16>(t, i, (ld_s24_le(s, i) >> 16) as i16));
kernel!(s24_s32_be, widen, |t, s, i| st::<i32>(t, i, ld_s24_be(s, i)));
kernel!(s24_s32_le, widen, |t, s, i| st::<i32>(t, i, ld_s24_le(s, i)));
kernel!(s24_float_be, widen, |t, s, i| st::<f32>(t, i, ld_s24_be(s, i) as f32 / S32_FLT));
kernel!(s24_float_le, widen, |t, s, i| st::<f32>(t, i, ld_s24_le(s, i) as f32 / S32_FLT));
kernel!(s24_double_be, widen, |t, s, i| st::<f64>(t, i, (ld_s24_be(s, i) as f32 / S32_FLT) as f64));
kernel!(s24_double_le, widen, |t, s, i| st::<f64>(t, i, (ld_s24_le(s, i) as f32 / S32_FLT) as f64));

// s32 ->
kernel!(s32_u8, narrow, |t, s, i| st::<u8>(t, i, ((ld::<i32>(s, i) >> 24) + U8_ZERO as i32) as u8));
kernel!(s32_s16, narrow, |t, s, i| st::<i16>(t, i, (ld::<i32>(s, i) >> 16) as i16));
kernel!(s32_s24_be, narrow, |t, s, i| st_s24_be(t, i, ld::<i32>(s, i)));
kernel!(s32_s24_le, narrow, |t, s, i| st_s24_le(t, i, ld::<i32>(s, i)));
kernel!(s32_float, narrow, |t, s, i| st::<f32>(t, i, ld::<i32>(s, i) as f32 / S32_FLT));
kernel!(s32_double, widen, |t, s, i| st::<f64>(t, i, (ld::<i32>(s, i) as f32 / S32_FLT) as f64));

#[inline(always)]
fn float_to_u8(v: f32) -> u8 {
    let t = v + FLT_MAX;
    if t <= 0.0 {
        0
    } else if t >= 2.0 {
        255
    } else {
        (t * 127.0) as u8
    }
}

#[inline(always)]
fn float_to_s16(v: f32) -> i16 {
    if v <= FLT_MIN {
        S16_MIN
    } else if v >= FLT_MAX {
        S16_MAX
    } else {
        (v * S16_MAX as f32) as i16
    }
}

#[inline(always)]
fn float_to_s32(v: f32) -> i32 {
    if v <= FLT_MIN {
        S32_MIN
    } else if v >= FLT_MAX {
        S32_MAX
    } else {
        (v * S32_MAX as f32) as i32
    }
}

#[inline(always)]
fn double_to_u8(v: f64) -> u8 {
    let t = v + FLT_MAX as f64;
    if t <= 0.0 {
        0
    } else if t >= 2.0 {
        255
    } else {
        (t * 127.0) as u8
    }
}

#[inline(always)]
fn double_to_s16(v: f64) -> i16 {
    if v <= FLT_MIN as f64 {
        S16_MIN
    } else if v >= FLT_MAX as f64 {
        S16_MAX
    } else {
        (v * S16_MAX as f64) as i16
    }
}

#[inline(always)]
fn double_to_s32(v: f64) -> i32 {
    if v <= FLT_MIN as f64 {
        S32_MIN
    } else if v >= FLT_MAX as f64 {
        S32_MAX
    } else {
        (v * S32_MAX as f64) as i32
    }
}

// float ->
kernel!(float_u8, narrow, |t, s, i| st::<u8>(t, i, float_to_u8(ld::<f32>(s, i))));
kernel!(float_s16, narrow, |t, s, i| st::<i16>(t, i, float_to_s16(ld::<f32>(s, i))));
kernel!(float_s24_be, narrow, |t, s, i| st_s24_be(t, i, float_to_s32(ld::<f32>(s, i))));
kernel!(float_s24_le, narrow, |t, s, i| st_s24_le(t, i, float_to_s32(ld::<f32>(s, i))));
kernel!(float_s32, narrow, |t, s, i| st::<i32>(t, i, float_to_s32(ld::<f32>(s, i))));
kernel!(float_double, widen, |t, s, i| st::<f64>(t, i, ld::<f32>(s, i) as f64));

// double ->
kernel!(double_u8, narrow, |t, s, i| st::<u8>(t, i, double_to_u8(ld::<f64>(s, i))));
kernel!(double_s16, narrow, |t, s, i| st::<i16>(t, i, double_to_s16(ld::<f64>(s, i))));
kernel!(double_s24_be, narrow, |t, s, i| st_s24_be(t, i, double_to_s32(ld::<f64>(s, i))));
kernel!(double_s24_le, narrow, |t, s, i| st_s24_le(t, i, double_to_s32(ld::<f64>(s, i))));
kernel!(double_s32, narrow, |t, s, i| st::<i32>(t, i, double_to_s32(ld::<f64>(s, i))));
kernel!(double_float, narrow, |t, s, i| st::<f32>(t, i, ld::<f64>(s, i) as f32));

fn kernel_for(from: SampleFormat, to: SampleFormat) -> Kernel {
    use SampleFormat::*;

    macro_rules! s24 {
        ($be:ident, $le:ident) => {
            if BIG_ENDIAN {
                $be
            } else {
                $le
            }
        };
    }

    match (from, to) {
        (U8, U8) => copy::<1>,
        (U8, S16) => u8_s16,
        (U8, S24) => s24!(u8_s24_be, u8_s24_le),
        (U8, S32) => u8_s32,
        (U8, Float32) => u8_float,
        (U8, Float64) => u8_double,

        (S16, U8) => s16_u8,
        (S16, S16) => copy::<2>,
        (S16, S24) => s24!(s16_s24_be, s16_s24_le),
        (S16, S32) => s16_s32,
        (S16, Float32) => s16_float,
        (S16, Float64) => s16_double,

        (S24, U8) => s24!(s24_u8_be, s24_u8_le),
        (S24, S16) => s24!(s24_s16_be, s24_s16_le),
        (S24, S24) => copy::<3>,
        (S24, S32) => s24!(s24_s32_be, s24_s32_le),
        (S24, Float32) => s24!(s24_float_be, s24_float_le),
        (S24, Float64) => s24!(s24_double_be, s24_double_le),

        (S32, U8) => s32_u8,
        (S32, S16) => s32_s16,
        (S32, S24) => s24!(s32_s24_be, s32_s24_le),
        (S32, S32) => copy::<4>,
        (S32, Float32) => s32_float,
        (S32, Float64) => s32_double,

        (Float32, U8) => float_u8,
        (Float32, S16) => float_s16,
        (Float32, S24) => s24!(float_s24_be, float_s24_le),
        (Float32, S32) => float_s32,
        (Float32, Float32) => copy::<4>,
        (Float32, Float64) => float_double,

        (Float64, U8) => double_u8,
        (Float64, S16) => double_s16,
        (Float64, S24) => s24!(double_s24_be, double_s24_le),
        (Float64, S32) => double_s32,
        (Float64, Float32) => double_float,
        (Float64, Float64) => copy::<8>,
    }
}

/// A conversion function bound to one (source, target) encoding pair.
#[derive(Clone, Copy)]
pub struct Converter {
    from: SampleFormat,
    to: SampleFormat,
    kernel: Kernel,
}

impl Converter {
    pub fn new(from: SampleFormat, to: SampleFormat) -> Self {
        Self {
            from,
            to,
            kernel: kernel_for(from, to),
        }
    }

    /// Converter from canonical float samples to `to`.
    pub fn from_float(to: SampleFormat) -> Self {
        Self::new(SampleFormat::Float32, to)
    }

    /// Converter from `from` to canonical float samples.
    pub fn to_float(from: SampleFormat) -> Self {
        Self::new(from, SampleFormat::Float32)
    }

    #[inline]
    pub fn source_format(&self) -> SampleFormat {
        self.from
    }

    #[inline]
    pub fn target_format(&self) -> SampleFormat {
        self.to
    }

    /// Whether the kernel walks from the last sample to the first.
    pub fn iterates_backwards(&self) -> bool {
        self.to.sample_size() > self.from.sample_size()
    }

    /// Convert `samples` scalar samples from `source` into `target`.
    ///
    /// # Panics
    ///
    /// If either slice is too short for `samples` samples of its encoding.
    pub fn convert(&self, target: &mut [u8], source: &[u8], samples: usize) {
        assert!(
            source.len() >= samples * self.from.sample_size(),
            "source holds {} bytes, {} {} samples need {}",
            source.len(),
            samples,
            self.from,
            samples * self.from.sample_size()
        );
        assert!(
            target.len() >= samples * self.to.sample_size(),
            "target holds {} bytes, {} {} samples need {}",
            target.len(),
            samples,
            self.to,
            samples * self.to.sample_size()
        );
        // SAFETY: both regions were checked to cover `samples` samples and the
        // kernels only use unaligned raw reads and writes.
        unsafe { (self.kernel)(target.as_mut_ptr(), source.as_ptr(), samples) }
    }

    /// Convert `samples` samples stored at the start of `buffer`, in place.
    ///
    /// # Panics
    ///
    /// If `buffer` cannot hold `samples` samples of the wider encoding.
    pub fn convert_in_place(&self, buffer: &mut [u8], samples: usize) {
        let width = self.from.sample_size().max(self.to.sample_size());
        assert!(
            buffer.len() >= samples * width,
            "buffer holds {} bytes, in-place {} -> {} of {} samples needs {}",
            buffer.len(),
            self.from,
            self.to,
            samples,
            samples * width
        );
        let ptr = buffer.as_mut_ptr();
        // SAFETY: the region covers both encodings; the kernel's iteration
        // direction never overwrites unread source bytes.
        unsafe { (self.kernel)(ptr, ptr, samples) }
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Convert `samples` samples between two encodings.
pub fn convert(
    from: SampleFormat,
    to: SampleFormat,
    target: &mut [u8],
    source: &[u8],
    samples: usize,
) {
    Converter::new(from, to).convert(target, source, samples);
}
