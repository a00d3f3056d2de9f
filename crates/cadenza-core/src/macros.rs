//! Reader composition macros.

/// Generate pass-through [`Reader`](crate::Reader) methods for an effect
/// that owns its delegate in a field named `reader`.
///
/// List the methods the effect does not change; write the rest by hand.
///
/// # Example
/// ```ignore
/// impl Reader for GainReader {
///     forward_reader!(specs, is_seekable, length, position, seek);
///
///     fn read(&mut self, length: usize, buffer: &mut [f32]) -> Result<ReadStatus> {
///         let status = self.reader.read(length, buffer)?;
///         // ...
///         Ok(status)
///     }
/// }
/// ```
#[macro_export]
macro_rules! forward_reader {
    ($($method:ident),+ $(,)?) => {
        $( $crate::forward_reader!(@$method); )+
    };

    (@specs) => {
        fn specs(&self) -> $crate::Specs {
            self.reader.specs()
        }
    };

    (@is_seekable) => {
        fn is_seekable(&self) -> bool {
            self.reader.is_seekable()
        }
    };

    (@length) => {
        fn length(&self) -> i64 {
            self.reader.length()
        }
    };

    (@position) => {
        fn position(&self) -> i64 {
            self.reader.position()
        }
    };

    (@seek) => {
        fn seek(&mut self, position: i64) {
            self.reader.seek(position)
        }
    };

    (@read) => {
        fn read(
            &mut self,
            length: usize,
            buffer: &mut [f32],
        ) -> $crate::Result<$crate::ReadStatus> {
            self.reader.read(length, buffer)
        }
    };
}
