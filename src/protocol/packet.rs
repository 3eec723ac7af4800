//! Packet type tags
//!
//! ```text
//! 0x01 FILE_TRANSFER  nameLen:u16 name:utf8 fileSize:u64 content:bytes
//! 0x02 FILE_FETCH     nameLen:u16 name:utf8
//! 0x03 MESSAGE        contentLen:u16 content:utf8
//! ```
//!
//! All integers are little-endian.

use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite};

use super::codec::{read_uint, write_uint, PACKET_TYPE_LEN};
use crate::error::{TransferError, TransferResult};

/// One-byte discriminator that leads every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
	FileTransfer = 1,
	FileFetch = 2,
	Message = 3,
}

impl PacketType {
	pub fn as_u8(self) -> u8 {
		self as u8
	}
}

impl TryFrom<u8> for PacketType {
	type Error = TransferError;

	fn try_from(tag: u8) -> Result<Self, Self::Error> {
		match tag {
			1 => Ok(PacketType::FileTransfer),
			2 => Ok(PacketType::FileFetch),
			3 => Ok(PacketType::Message),
			other => Err(TransferError::protocol(format!("Unknown packet type: {}", other))),
		}
	}
}

impl fmt::Display for PacketType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PacketType::FileTransfer => write!(f, "FILE_TRANSFER"),
			PacketType::FileFetch => write!(f, "FILE_FETCH"),
			PacketType::Message => write!(f, "MESSAGE"),
		}
	}
}

/// Read the raw type byte. The caller decides what an unknown tag means.
pub async fn read_packet_tag<R>(conn: &mut R) -> TransferResult<u8>
where
	R: AsyncRead + Unpin,
{
	Ok(read_uint(conn, PACKET_TYPE_LEN).await? as u8)
}

pub async fn write_packet_type<W>(conn: &mut W, packet_type: PacketType) -> TransferResult<()>
where
	W: AsyncWrite + Unpin,
{
	write_uint(conn, u64::from(packet_type.as_u8()), PACKET_TYPE_LEN).await
}


// vim: ts=4
