//! `FrameView` over a hook context's packet pointers.

use portwarden_engine::frame::FrameView;

/// Bounds-checked view over the `data`..`data_end` range of a packet
/// context.
///
/// Every read re-checks the full access against `data_end` before
/// dereferencing, which is exactly the discipline the verifier demands of
/// direct packet access.
pub struct PacketView {
    data: usize,
    data_end: usize,
}

impl PacketView {
    /// Wraps the pointer pair of an XDP or TC context.
    #[inline(always)]
    pub fn new(data: usize, data_end: usize) -> Self {
        Self { data, data_end }
    }
}

impl FrameView for PacketView {
    #[inline(always)]
    fn frame_len(&self) -> usize {
        self.data_end.saturating_sub(self.data)
    }

    #[inline(always)]
    fn read_u8(&self, offset: usize) -> Option<u8> {
        let addr = self.data + offset;
        if addr + 1 > self.data_end {
            return None;
        }
        Some(unsafe { *(addr as *const u8) })
    }

    #[inline(always)]
    fn read_u16_be(&self, offset: usize) -> Option<u16> {
        let addr = self.data + offset;
        if addr + 2 > self.data_end {
            return None;
        }
        Some(u16::from_be(unsafe { *(addr as *const u16) }))
    }
}
