//! Bounds-checked access to a raw frame.
//!
//! The parser never touches frame memory directly; every read goes through
//! a [`FrameView`], whose implementations check each access against the
//! buffer's actual extent and answer `None` past the end. Kernel adapters
//! implement it over the hook context's `data`/`data_end` pointers;
//! userspace gets the byte-slice impl below.

/// A contiguous frame of runtime-determined length.
///
/// Implementations must never allow a read past [`Self::frame_len`] bytes,
/// whatever offset they are handed.
pub trait FrameView {
    /// Exact number of valid bytes in the frame.
    fn frame_len(&self) -> usize;

    /// Reads one byte at `offset`, or `None` if it lies outside the frame.
    fn read_u8(&self, offset: usize) -> Option<u8>;

    /// Reads a big-endian u16 at `offset`, converted to host byte order,
    /// or `None` if any of its bytes lie outside the frame.
    fn read_u16_be(&self, offset: usize) -> Option<u16>;
}

impl FrameView for [u8] {
    #[inline]
    fn frame_len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn read_u8(&self, offset: usize) -> Option<u8> {
        self.get(offset).copied()
    }

    #[inline]
    fn read_u16_be(&self, offset: usize) -> Option<u16> {
        let hi = *self.get(offset)?;
        let lo = *self.get(offset.checked_add(1)?)?;
        Some(u16::from_be_bytes([hi, lo]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reads_inside_bounds() {
        let buf = [0xab, 0xcd, 0xef];
        assert_eq!(buf.read_u8(0), Some(0xab));
        assert_eq!(buf.read_u8(2), Some(0xef));
        assert_eq!(buf.read_u16_be(1), Some(0xcdef));
    }

    #[test]
    fn slice_rejects_reads_past_the_end() {
        let buf = [0xab, 0xcd];
        assert_eq!(buf.read_u8(2), None);
        assert_eq!(buf.read_u16_be(1), None);
        assert_eq!(buf.read_u16_be(usize::MAX), None);
    }

    #[test]
    fn empty_slice_rejects_everything() {
        let buf: [u8; 0] = [];
        assert_eq!(buf.frame_len(), 0);
        assert_eq!(buf.read_u8(0), None);
        assert_eq!(buf.read_u16_be(0), None);
    }
}
