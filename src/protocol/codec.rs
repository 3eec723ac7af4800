//! Primitive field codec
//!
//! Fixed-width little-endian unsigned integers and UTF-8 strings, read from and
//! written to the connection one field at a time. Every read waits for the full
//! field; a stream that ends early fails with `UnexpectedEof` instead of
//! leaving the parser misaligned.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{TransferError, TransferResult};

/// Width of the packet type field
pub const PACKET_TYPE_LEN: u8 = 1;

/// Width of the name and message length fields
pub const NAME_LEN: u8 = 2;

/// Width of the file size field
pub const FILE_LEN: u8 = 8;

fn check_width(width: u8) -> TransferResult<usize> {
	match width {
		1 | 2 | 4 | 8 => Ok(width as usize),
		_ => Err(TransferError::protocol(format!("Invalid field width: {}", width))),
	}
}

/// Read an unsigned little-endian integer that is `width` bytes wide.
///
/// Only widths of 1, 2, 4 and 8 bytes are supported.
pub async fn read_uint<R>(conn: &mut R, width: u8) -> TransferResult<u64>
where
	R: AsyncRead + Unpin,
{
	let len = check_width(width)?;
	let mut data = [0u8; 8];
	conn.read_exact(&mut data[..len]).await?;
	Ok(u64::from_le_bytes(data))
}

/// Write `value` as an unsigned little-endian integer that is `width` bytes wide.
///
/// Values that do not fit into the requested width are rejected rather than
/// truncated.
pub async fn write_uint<W>(conn: &mut W, value: u64, width: u8) -> TransferResult<()>
where
	W: AsyncWrite + Unpin,
{
	let len = check_width(width)?;
	if len < 8 && value >> (len * 8) != 0 {
		return Err(TransferError::protocol(format!(
			"Value {} does not fit into {} bytes",
			value, width
		)));
	}
	let data = value.to_le_bytes();
	conn.write_all(&data[..len]).await?;
	Ok(())
}

/// Read exactly `len` raw bytes.
pub async fn read_bytes<R>(conn: &mut R, len: usize) -> TransferResult<Vec<u8>>
where
	R: AsyncRead + Unpin,
{
	let mut data = vec![0u8; len];
	conn.read_exact(&mut data).await?;
	Ok(data)
}

/// Interpret bytes that were already taken off the wire as UTF-8.
///
/// Malformed input is reported, never replaced with substitution characters.
/// The error is [`TransferError::Malformed`]: the bytes were consumed, so the
/// stream itself is still aligned.
pub fn decode_utf8(data: Vec<u8>) -> TransferResult<String> {
	String::from_utf8(data)
		.map_err(|e| TransferError::malformed(format!("Invalid UTF-8 in string field: {}", e)))
}

/// Read exactly `len` bytes and decode them as UTF-8.
pub async fn read_utf8<R>(conn: &mut R, len: usize) -> TransferResult<String>
where
	R: AsyncRead + Unpin,
{
	decode_utf8(read_bytes(conn, len).await?)
}

/// Write the UTF-8 bytes of `content`, without any length prefix.
pub async fn write_utf8<W>(conn: &mut W, content: &str) -> TransferResult<()>
where
	W: AsyncWrite + Unpin,
{
	conn.write_all(content.as_bytes()).await?;
	Ok(())
}

/// Length of `content` as a 2-byte length field, or an error if it does not fit
pub(crate) fn short_len(content: &str) -> TransferResult<u16> {
	u16::try_from(content.len()).map_err(|_| {
		TransferError::protocol(format!(
			"String of {} bytes exceeds the {} byte limit",
			content.len(),
			u16::MAX
		))
	})
}

/// Write a length-prefixed string: a 2-byte length followed by the UTF-8 bytes.
pub(crate) async fn write_short_str<W>(conn: &mut W, content: &str) -> TransferResult<()>
where
	W: AsyncWrite + Unpin,
{
	let len = short_len(content)?;
	write_uint(conn, u64::from(len), NAME_LEN).await?;
	write_utf8(conn, content).await
}

/// Read a length-prefixed string written by [`write_short_str`].
pub(crate) async fn read_short_str<R>(conn: &mut R) -> TransferResult<String>
where
	R: AsyncRead + Unpin,
{
	let len = read_uint(conn, NAME_LEN).await?;
	read_utf8(conn, len as usize).await
}


// vim: ts=4
