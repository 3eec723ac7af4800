//! Per-connection read loop
//!
//! Waits for a packet type byte, runs the matching handler, and repeats until
//! the stream breaks or something arrives that cannot be parsed. An unknown type
//! byte ends the connection: without a resynchronization marker there is no way
//! to find the start of the next frame.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{TransferError, TransferResult};
use crate::events::{EventSink, TransferEvent};
use crate::protocol::{
	parse_file_request, read_msg, read_packet_tag, receive_file, send_file, write_msg,
	PacketType, TransferBuffer,
};
use crate::validation::resolve_in_dir;

/// Serves the frames arriving on one connection
pub struct Dispatcher {
	peer: String,
	storage_dir: PathBuf,
	buffer: TransferBuffer,
	sink: Arc<dyn EventSink>,
}

impl Dispatcher {
	pub fn new(
		peer: impl Into<String>,
		storage_dir: PathBuf,
		buffer_size: usize,
		sink: Arc<dyn EventSink>,
	) -> Self {
		Self { peer: peer.into(), storage_dir, buffer: TransferBuffer::new(buffer_size), sink }
	}

	fn emit(&self, event: TransferEvent) {
		self.sink.on_event(event);
	}

	/// Run the loop until the connection ends.
	///
	/// Returns `Ok(())` when the peer disconnects between frames, and the error
	/// that closed the connection otherwise.
	pub async fn run<S>(&mut self, conn: &mut S) -> TransferResult<()>
	where
		S: AsyncRead + AsyncWrite + Unpin,
	{
		self.emit(TransferEvent::Connected { peer: self.peer.clone() });

		loop {
			let tag = match read_packet_tag(conn).await {
				Ok(tag) => tag,
				Err(e) => {
					self.emit(TransferEvent::Disconnected {
						peer: self.peer.clone(),
						reason: e.to_string(),
					});
					return Ok(());
				}
			};

			let packet_type = match PacketType::try_from(tag) {
				Ok(t) => t,
				Err(e) => {
					self.emit(TransferEvent::UnknownPacket { peer: self.peer.clone(), tag });
					return Err(e);
				}
			};

			let (operation, result) = match packet_type {
				PacketType::FileTransfer => ("receive file", self.accept_file(conn).await),
				PacketType::FileFetch => ("send file", self.serve_fetch(conn).await),
				PacketType::Message => ("receive message", self.receive_message(conn).await),
			};

			if let Err(e) = result {
				let fatal = e.is_fatal_for_session();
				self.emit(TransferEvent::Failed {
					peer: self.peer.clone(),
					operation,
					error: e.to_string(),
					fatal,
				});
				if fatal {
					return Err(e);
				}
			}
		}
	}

	async fn accept_file<R>(&mut self, conn: &mut R) -> TransferResult<()>
	where
		R: AsyncRead + Unpin,
	{
		self.emit(TransferEvent::ReceiveStarted {
			peer: self.peer.clone(),
			save_dir: self.storage_dir.clone(),
		});
		let started = Instant::now();
		let received = receive_file(conn, &mut self.buffer, &self.storage_dir).await?;
		self.emit(TransferEvent::FileReceived {
			peer: self.peer.clone(),
			path: received.path,
			size: received.size,
			elapsed: started.elapsed(),
		});
		Ok(())
	}

	/// Answer a FILE_FETCH with the file, or with a message saying why not
	async fn serve_fetch<S>(&mut self, conn: &mut S) -> TransferResult<()>
	where
		S: AsyncRead + AsyncWrite + Unpin,
	{
		let name = match parse_file_request(conn).await {
			Ok(n) => n,
			// The request was read in full, so it can still be answered
			Err(e @ TransferError::Malformed(_)) => {
				return self.reject_fetch(conn, String::new(), e).await
			}
			Err(e) => return Err(e),
		};

		let path = match resolve_in_dir(&self.storage_dir, &name) {
			Ok(p) => p,
			Err(e) => return self.reject_fetch(conn, name, e).await,
		};

		self.emit(TransferEvent::SendStarted { peer: self.peer.clone(), path: path.clone() });
		let started = Instant::now();
		match send_file(conn, &mut self.buffer, &path).await {
			Ok(sent) => {
				self.emit(TransferEvent::FileSent {
					peer: self.peer.clone(),
					path,
					size: sent.size,
					elapsed: started.elapsed(),
				});
				Ok(())
			}
			// Nothing reached the wire yet, so the peer can still be told
			Err(e @ TransferError::FileAccess { .. }) => self.reject_fetch(conn, name, e).await,
			Err(e) => Err(e),
		}
	}

	async fn reject_fetch<W>(&self, conn: &mut W, name: String, reason: TransferError) -> TransferResult<()>
	where
		W: AsyncWrite + Unpin,
	{
		let reason = reason.to_string();
		write_msg(conn, &reason).await?;
		self.emit(TransferEvent::FetchRejected { peer: self.peer.clone(), name, reason });
		Ok(())
	}

	async fn receive_message<R>(&self, conn: &mut R) -> TransferResult<()>
	where
		R: AsyncRead + Unpin,
	{
		let content = read_msg(conn).await?;
		self.emit(TransferEvent::MessageReceived { peer: self.peer.clone(), content });
		Ok(())
	}
}


// vim: ts=4
