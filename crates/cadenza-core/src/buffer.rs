//! Aligned, resizable block of raw sample memory.

use bytemuck::{Pod, Zeroable};

/// Alignment of every [`Buffer`] data pointer, in bytes.
pub const ALIGNMENT: usize = 32;

#[derive(Clone, Copy)]
#[repr(C, align(32))]
struct Block([u8; ALIGNMENT]);

// SAFETY: `Block` is a plain byte array whose size equals its alignment,
// so it has no padding and every bit pattern is valid.
unsafe impl Zeroable for Block {}
unsafe impl Pod for Block {}

impl Block {
    const ZERO: Block = Block([0; ALIGNMENT]);
}

/// Owns one heap allocation aligned to [`ALIGNMENT`] bytes.
///
/// The storage is a vector of aligned blocks, so the data pointer stays
/// aligned no matter how often the buffer is resized. Allocation failure
/// aborts the process.
#[derive(Clone, Default)]
pub struct Buffer {
    blocks: Vec<Block>,
    size: usize,
}

#[inline]
fn blocks_for(size: usize) -> usize {
    size.div_ceil(ALIGNMENT)
}

impl Buffer {
    /// Allocate `size` zeroed bytes.
    pub fn new(size: usize) -> Self {
        Self {
            blocks: vec![Block::ZERO; blocks_for(size)],
            size,
        }
    }

    /// Allocate room for `samples` f32 values.
    pub fn with_samples(samples: usize) -> Self {
        Self::new(samples * std::mem::size_of::<f32>())
    }

    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Resize to `size` bytes.
    ///
    /// With `keep`, the first `min(old, new)` bytes survive; otherwise the
    /// content is unspecified. The memory may move either way.
    pub fn resize(&mut self, size: usize, keep: bool) {
        let blocks = blocks_for(size);
        if keep || blocks <= self.blocks.len() {
            self.blocks.resize(blocks, Block::ZERO);
        } else {
            self.blocks = vec![Block::ZERO; blocks];
        }
        self.size = size;
    }

    /// Grow to at least `size` bytes; no-op when already large enough.
    pub fn assure_size(&mut self, size: usize, keep: bool) {
        if self.size < size {
            self.resize(size, keep);
        }
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_bytes().as_ptr()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<Block, u8>(&self.blocks)[..self.size]
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let size = self.size;
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..size]
    }

    /// Float view over the whole 4-byte samples contained in the buffer.
    #[inline]
    pub fn as_f32(&self) -> &[f32] {
        let len = self.size / 4 * 4;
        bytemuck::cast_slice(&self.as_bytes()[..len])
    }

    #[inline]
    pub fn as_f32_mut(&mut self) -> &mut [f32] {
        let len = self.size / 4 * 4;
        bytemuck::cast_slice_mut(&mut self.as_bytes_mut()[..len])
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").field("size", &self.size).finish()
    }
}
