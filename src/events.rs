//! Connection events and the sinks that report them
//!
//! The dispatcher does not log on its own. Everything worth reporting is turned
//! into a [`TransferEvent`] and handed to an [`EventSink`].

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crate::logging::*;

/// Something that happened on a served connection
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
	/// A peer connected
	Connected { peer: String },

	/// A file transfer is starting to be received
	ReceiveStarted { peer: String, save_dir: PathBuf },

	/// A pushed file was stored
	FileReceived { peer: String, path: PathBuf, size: u64, elapsed: Duration },

	/// A fetched file is about to be sent back
	SendStarted { peer: String, path: PathBuf },

	/// A fetched file was streamed back to the peer
	FileSent { peer: String, path: PathBuf, size: u64, elapsed: Duration },

	/// A fetch could not be served; the reason went back as a message
	FetchRejected { peer: String, name: String, reason: String },

	/// A text message arrived
	MessageReceived { peer: String, content: String },

	/// An operation failed. `fatal` tells whether the connection is closed because of it.
	Failed { peer: String, operation: &'static str, error: String, fatal: bool },

	/// The type byte did not name a known packet; the connection is closed
	UnknownPacket { peer: String, tag: u8 },

	/// The peer went away or the stream broke while waiting for a frame
	Disconnected { peer: String, reason: String },
}

/// Receiver of connection events
pub trait EventSink: Send + Sync {
	/// Called for every event, in order, from the connection's task
	fn on_event(&self, event: TransferEvent);
}

/// Sink that drops every event
pub struct NoEvents;

impl EventSink for NoEvents {
	fn on_event(&self, _event: TransferEvent) {}
}

/// Sink that writes events to the tracing subscriber
pub struct TracingSink;

impl EventSink for TracingSink {
	fn on_event(&self, event: TransferEvent) {
		match event {
			TransferEvent::Connected { peer } => info!("({}) new client connection", peer),
			TransferEvent::ReceiveStarted { peer, save_dir } => {
				info!("({}) receiving file into {}", peer, save_dir.display())
			}
			TransferEvent::FileReceived { peer, path, size, elapsed } => {
				info!("({}) stored {} ({} bytes) in {:?}", peer, path.display(), size, elapsed)
			}
			TransferEvent::SendStarted { peer, path } => {
				info!("({}) sending file {}...", peer, path.display())
			}
			TransferEvent::FileSent { peer, path, size, elapsed } => {
				info!("({}) sent {} ({} bytes) in {:?}", peer, path.display(), size, elapsed)
			}
			TransferEvent::FetchRejected { peer, name, reason } => {
				warn!("({}) cannot serve fetch for {}: {}", peer, name, reason)
			}
			TransferEvent::MessageReceived { peer, content } => {
				info!("({}) message: {}", peer, content)
			}
			TransferEvent::Failed { peer, operation, error, fatal } => {
				if fatal {
					error!("({}) {} failed, closing connection: {}", peer, operation, error)
				} else {
					warn!("({}) {} failed: {}", peer, operation, error)
				}
			}
			TransferEvent::UnknownPacket { peer, tag } => {
				warn!("({}) unknown packet type {}, closing connection", peer, tag)
			}
			TransferEvent::Disconnected { peer, reason } => {
				info!("({}) connection closed: {}", peer, reason)
			}
		}
	}
}

/// Sink that keeps every event in memory, in arrival order
#[derive(Default)]
pub struct RecordingSink {
	events: Mutex<Vec<TransferEvent>>,
}

impl RecordingSink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Copy of everything recorded so far
	pub fn events(&self) -> Vec<TransferEvent> {
		self.events.lock().map(|events| events.clone()).unwrap_or_default()
	}
}

impl EventSink for RecordingSink {
	fn on_event(&self, event: TransferEvent) {
		if let Ok(mut events) = self.events.lock() {
			events.push(event);
		}
	}
}


// vim: ts=4
