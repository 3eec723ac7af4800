//! Error types for transfer operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type for transfer operations
pub type TransferResult<T> = Result<T, TransferError>;

/// Main error type for codec, protocol and session operations
#[derive(Debug)]
pub enum TransferError {
	/// Socket or filesystem read/write failure
	Io(io::Error),

	/// Unexpected value on the wire (bad field width, unknown packet type, ...)
	Protocol(String),

	/// A frame was read completely, but one of its fields cannot be used
	/// (non-UTF-8 text, unsafe file name). The stream is still aligned.
	Malformed(String),

	/// Local file missing or unreadable before anything was sent
	FileAccess { path: PathBuf, source: io::Error },

	/// Peer reported a failure through a message packet
	Remote(String),
}

impl TransferError {
	/// Shorthand for building a [`TransferError::Protocol`]
	pub fn protocol(message: impl Into<String>) -> Self {
		TransferError::Protocol(message.into())
	}

	/// Shorthand for building a [`TransferError::Malformed`]
	pub fn malformed(message: impl Into<String>) -> Self {
		TransferError::Malformed(message.into())
	}

	/// Whether the connection framing can no longer be trusted after this error.
	///
	/// `FileAccess` happens before any byte is written, `Malformed` is raised
	/// only after its frame was fully consumed, and `Remote` arrives as a
	/// complete message frame, so all three leave the stream aligned.
	pub fn is_fatal_for_session(&self) -> bool {
		matches!(self, TransferError::Io(_) | TransferError::Protocol(_))
	}
}

impl fmt::Display for TransferError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransferError::Io(e) => write!(f, "I/O error: {}", e),
			TransferError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
			TransferError::Malformed(msg) => write!(f, "Malformed frame: {}", msg),
			TransferError::FileAccess { path, source } => {
				write!(f, "Cannot access file {}: {}", path.display(), source)
			}
			TransferError::Remote(msg) => write!(f, "Remote error: {}", msg),
		}
	}
}

impl Error for TransferError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			TransferError::Io(e) => Some(e),
			TransferError::FileAccess { source, .. } => Some(source),
			_ => None,
		}
	}
}

impl From<io::Error> for TransferError {
	fn from(e: io::Error) -> Self {
		TransferError::Io(e)
	}
}


// vim: ts=4
