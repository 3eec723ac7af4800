//! Wire protocol
//!
//! A connection carries a sequence of frames. Each frame starts with a one-byte
//! [`PacketType`] followed by fields whose layout depends on the type:
//!
//! | Packet        | Type | Fields                                                  |
//! |---------------|------|---------------------------------------------------------|
//! | File transfer | 0x01 | nameLen:u16, name:utf8, fileSize:u64, content           |
//! | File fetch    | 0x02 | nameLen:u16, name:utf8 (answered by 0x01 or 0x03)       |
//! | Message       | 0x03 | contentLen:u16, content:utf8                            |
//!
//! # Example Usage
//!
//! ```ignore
//! use lan_transfer::protocol::{send_file, TransferBuffer};
//!
//! let mut buffer = TransferBuffer::default();
//! let sent = send_file(&mut stream, &mut buffer, Path::new("report.csv")).await?;
//! ```

pub mod buffer;
pub mod codec;
pub mod packet;
pub mod transfer;

pub use buffer::{TransferBuffer, DEFAULT_BUFFER_SIZE};
pub use codec::{read_uint, read_utf8, write_uint, write_utf8};
pub use packet::{read_packet_tag, write_packet_type, PacketType};
pub use transfer::{
	fetch_file, parse_file_request, read_msg, receive_file, send_file, write_msg, ReceivedFile,
	SentFile,
};

// vim: ts=4
