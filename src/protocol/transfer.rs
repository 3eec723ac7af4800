//! File and message exchanges
//!
//! Frames are written and parsed field by field straight on the connection.
//! File contents never sit in memory as a whole; they stream through the
//! caller's [`TransferBuffer`].
//!
//! Nothing here logs. Outcomes are returned to the caller, which decides how
//! to report them.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs as afs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::buffer::TransferBuffer;
use super::codec::{
	decode_utf8, read_bytes, read_short_str, read_uint, short_len, write_short_str, write_uint,
	FILE_LEN, NAME_LEN,
};
use super::packet::{read_packet_tag, write_packet_type, PacketType};
use crate::error::{TransferError, TransferResult};
use crate::validation::{file_basename, validate_file_name};

/// A file that was streamed to the peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFile {
	/// Name announced on the wire
	pub name: String,
	/// Number of content bytes written
	pub size: u64,
}

/// A file that was streamed from the peer and stored locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
	/// Where the content was written
	pub path: PathBuf,
	/// Number of content bytes received
	pub size: u64,
}

fn premature_eof(remaining: u64) -> TransferError {
	TransferError::Io(io::Error::new(
		io::ErrorKind::UnexpectedEof,
		format!("stream ended with {} bytes of file content outstanding", remaining),
	))
}

/// Stream a local file to the peer as a FILE_TRANSFER frame.
///
/// The file is stat'ed and opened before the first byte goes out, so an
/// unreadable file fails with [`TransferError::FileAccess`] and leaves the
/// connection untouched.
pub async fn send_file<W>(
	conn: &mut W,
	buffer: &mut TransferBuffer,
	local_path: &Path,
) -> TransferResult<SentFile>
where
	W: AsyncWrite + Unpin,
{
	let access = |source| TransferError::FileAccess { path: local_path.to_path_buf(), source };

	let meta = afs::metadata(local_path).await.map_err(access)?;
	if !meta.is_file() {
		return Err(access(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file")));
	}
	let mut file = afs::File::open(local_path).await.map_err(access)?;

	let name = file_basename(&local_path.to_string_lossy());
	short_len(&name)?;
	let size = meta.len();

	write_packet_type(conn, PacketType::FileTransfer).await?;
	write_short_str(conn, &name).await?;
	write_uint(conn, size, FILE_LEN).await?;

	// The announced size is authoritative; a file that grows meanwhile is cut
	// off and one that shrinks aborts the frame.
	let mut remaining = size;
	while remaining > 0 {
		let n = file.read(buffer.chunk(remaining)).await?;
		if n == 0 {
			return Err(premature_eof(remaining));
		}
		conn.write_all(buffer.filled(n)).await?;
		remaining -= n as u64;
	}
	conn.flush().await?;

	Ok(SentFile { name, size })
}

/// Receive the body of a FILE_TRANSFER frame (type byte already consumed).
///
/// The content is appended to `save_dir/<name>`, creating the file if needed.
/// Success is reached exactly when the announced number of bytes has been
/// stored; nothing past that point is read from the connection.
pub async fn receive_file<R>(
	conn: &mut R,
	buffer: &mut TransferBuffer,
	save_dir: &Path,
) -> TransferResult<ReceivedFile>
where
	R: AsyncRead + Unpin,
{
	let name_len = read_uint(conn, NAME_LEN).await?;
	let raw_name = read_bytes(conn, name_len as usize).await?;
	let size = read_uint(conn, FILE_LEN).await?;

	// The header is complete; a bad name only costs this frame's payload
	let name = match decode_utf8(raw_name).and_then(|n| validate_file_name(&n).map(|_| n)) {
		Ok(n) => n,
		Err(e) => {
			discard(conn, buffer, size).await?;
			return Err(e);
		}
	};

	let path = save_dir.join(&name);
	let mut file = match afs::OpenOptions::new().create(true).append(true).open(&path).await {
		Ok(f) => f,
		Err(source) => {
			discard(conn, buffer, size).await?;
			return Err(TransferError::FileAccess { path, source });
		}
	};

	let mut remaining = size;
	while remaining > 0 {
		let n = conn.read(buffer.chunk(remaining)).await?;
		if n == 0 {
			return Err(premature_eof(remaining));
		}
		file.write_all(buffer.filled(n)).await?;
		remaining -= n as u64;
	}
	file.flush().await?;

	Ok(ReceivedFile { path, size })
}

/// Skip `remaining` payload bytes so the next frame starts where it should
async fn discard<R>(conn: &mut R, buffer: &mut TransferBuffer, mut remaining: u64) -> TransferResult<()>
where
	R: AsyncRead + Unpin,
{
	while remaining > 0 {
		let n = conn.read(buffer.chunk(remaining)).await?;
		if n == 0 {
			return Err(premature_eof(remaining));
		}
		remaining -= n as u64;
	}
	Ok(())
}

/// Ask the peer for a file and store the answer in `save_dir`.
///
/// Only the base name of `remote_path` is sent. The peer answers with either a
/// FILE_TRANSFER frame or a MESSAGE frame describing why it cannot; the latter
/// becomes [`TransferError::Remote`] and no local file is created.
pub async fn fetch_file<S>(
	conn: &mut S,
	buffer: &mut TransferBuffer,
	remote_path: &str,
	save_dir: &Path,
) -> TransferResult<ReceivedFile>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	let name = file_basename(remote_path);
	short_len(&name)?;

	write_packet_type(conn, PacketType::FileFetch).await?;
	write_short_str(conn, &name).await?;
	conn.flush().await?;

	match PacketType::try_from(read_packet_tag(conn).await?)? {
		PacketType::FileTransfer => receive_file(conn, buffer, save_dir).await,
		PacketType::Message => Err(TransferError::Remote(read_msg(conn).await?)),
		PacketType::FileFetch => {
			Err(TransferError::protocol("Unexpected FILE_FETCH in reply to a fetch request"))
		}
	}
}

/// Read the body of a FILE_FETCH frame (type byte already consumed)
pub async fn parse_file_request<R>(conn: &mut R) -> TransferResult<String>
where
	R: AsyncRead + Unpin,
{
	read_short_str(conn).await
}

/// Send a MESSAGE frame
pub async fn write_msg<W>(conn: &mut W, content: &str) -> TransferResult<()>
where
	W: AsyncWrite + Unpin,
{
	short_len(content)?;
	write_packet_type(conn, PacketType::Message).await?;
	write_short_str(conn, content).await?;
	conn.flush().await?;
	Ok(())
}

/// Read the body of a MESSAGE frame (type byte already consumed)
pub async fn read_msg<R>(conn: &mut R) -> TransferResult<String>
where
	R: AsyncRead + Unpin,
{
	read_short_str(conn).await
}


// vim: ts=4
