//! Bounded byte accumulator for accumulate-until-flushed operation.

/// Fixed-capacity buffer with a write cursor. Writes past capacity are
/// dropped, never wrapped; the peer has already discarded the data by
/// the time we notice, so there is nobody left to signal.
pub struct BridgeBuffer<const CAP: usize> {
    data: [u8; CAP],
    cursor: usize,
}

impl<const CAP: usize> BridgeBuffer<CAP> {
    pub const fn new() -> Self {
        Self {
            data: [0; CAP],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Append as much of `bytes` as fits. Returns the number of bytes
    /// accepted; the rest is silently dropped.
    pub fn extend_truncating(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(CAP - self.cursor);
        self.data[self.cursor..self.cursor + take].copy_from_slice(&bytes[..take]);
        self.cursor += take;
        take
    }

    /// The accumulated bytes, oldest first.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.cursor]
    }

    /// Reset the cursor. The storage is not zeroed.
    pub fn clear(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bytes_up_to_capacity() {
        let mut buf: BridgeBuffer<8> = BridgeBuffer::new();
        assert_eq!(buf.extend_truncating(&[1, 2, 3]), 3);
        assert_eq!(buf.extend_truncating(&[4, 5]), 2);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn truncates_silently_at_capacity() {
        let mut buf: BridgeBuffer<4> = BridgeBuffer::new();
        assert_eq!(buf.extend_truncating(&[1, 2, 3]), 3);
        assert_eq!(buf.extend_truncating(&[4, 5, 6]), 1);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(buf.len(), buf.capacity());
        // Full buffer drops everything, no wraparound.
        assert_eq!(buf.extend_truncating(&[7]), 0);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn clear_resets_cursor_only() {
        let mut buf: BridgeBuffer<4> = BridgeBuffer::new();
        buf.extend_truncating(&[9, 9, 9, 9]);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.extend_truncating(&[1]), 1);
        assert_eq!(buf.as_slice(), &[1]);
    }
}
