//! Reusable transfer buffer
//!
//! One buffer is allocated per connection and lent to each streaming call in
//! turn. Its size bounds the chunk granularity, not the size of a file.

/// Default transfer buffer size (1 MiB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Fixed-size scratch space for streaming file contents between disk and socket
#[derive(Debug)]
pub struct TransferBuffer {
	data: Box<[u8]>,
}

impl TransferBuffer {
	/// Allocate a buffer of `size` bytes (at least one byte)
	pub fn new(size: usize) -> Self {
		Self { data: vec![0u8; size.max(1)].into_boxed_slice() }
	}

	/// Buffer capacity in bytes
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Never true: the buffer holds at least one byte
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Mutable view of at most `limit` bytes, used as the target of one read
	pub(crate) fn chunk(&mut self, limit: u64) -> &mut [u8] {
		let n = usize::try_from(limit).map_or(self.data.len(), |l| l.min(self.data.len()));
		&mut self.data[..n]
	}

	/// The first `n` bytes, used as the source of one write
	pub(crate) fn filled(&self, n: usize) -> &[u8] {
		&self.data[..n]
	}
}

impl Default for TransferBuffer {
	fn default() -> Self {
		Self::new(DEFAULT_BUFFER_SIZE)
	}
}


// vim: ts=4
