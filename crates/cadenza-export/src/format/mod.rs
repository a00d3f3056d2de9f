//! File format plugins.

#[cfg(feature = "wav")]
pub mod wav;

#[cfg(feature = "wav")]
pub use wav::{export_wav, register_wav, WavInput, WavOutput};

use cadenza_core::FileManager;

/// Register every plugin compiled into this crate.
pub fn register_all(manager: &FileManager) {
    #[cfg(feature = "wav")]
    register_wav(manager);

    tracing::debug!(
        inputs = manager.input_count(),
        outputs = manager.output_count(),
        "file plugins registered"
    );
}
