//! Client session and its interactive command loop
//!
//! The client issues one command at a time and waits for the whole exchange,
//! file stream included, before reading the next one.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{TransferError, TransferResult};
use crate::logging::*;
use crate::protocol::{fetch_file, send_file, write_msg, ReceivedFile, SentFile, TransferBuffer};

/// Usage banner shown after connecting and on `help`
pub const USAGE: &str = "Supported commands:
  transfer-file <local path>              push a file to the server
  fetch-file <remote path> <save dir>     pull a file from the server
  send-msg <text...>                      send a text message
  bye                                     close the session";

/// One line of user input, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	TransferFile(PathBuf),
	FetchFile { remote_path: String, save_dir: PathBuf },
	SendMessage(String),
	Bye,
	Help,
	Empty,
	/// Known command with missing arguments
	Invalid(String),
	Unknown(String),
}

impl Command {
	pub fn parse(line: &str) -> Self {
		let mut words = line.split_whitespace();
		let order = match words.next() {
			Some(order) => order,
			None => return Command::Empty,
		};
		let args: Vec<&str> = words.collect();

		match order {
			"transfer-file" => match args.first() {
				Some(path) => Command::TransferFile(PathBuf::from(path)),
				None => Command::Invalid("usage: transfer-file <local path>".to_string()),
			},
			"fetch-file" => match (args.first(), args.get(1)) {
				(Some(remote), Some(save_dir)) => Command::FetchFile {
					remote_path: remote.to_string(),
					save_dir: PathBuf::from(save_dir),
				},
				_ => Command::Invalid("usage: fetch-file <remote path> <save dir>".to_string()),
			},
			"send-msg" => Command::SendMessage(args.join(" ")),
			"bye" => Command::Bye,
			"help" => Command::Help,
			other => Command::Unknown(other.to_string()),
		}
	}
}

/// An open connection to the server plus the session's transfer buffer
pub struct ClientSession<S> {
	conn: S,
	buffer: TransferBuffer,
}

impl ClientSession<TcpStream> {
	/// Connect to `address` (`host:port`)
	pub async fn connect(address: &str, buffer_size: usize) -> TransferResult<Self> {
		let conn = TcpStream::connect(address).await?;
		conn.set_nodelay(true)?;
		Ok(Self::new(conn, buffer_size))
	}
}

impl<S> ClientSession<S>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	pub fn new(conn: S, buffer_size: usize) -> Self {
		Self { conn, buffer: TransferBuffer::new(buffer_size) }
	}

	/// Push a local file to the server
	pub async fn transfer_file(&mut self, local_path: &Path) -> TransferResult<SentFile> {
		send_file(&mut self.conn, &mut self.buffer, local_path).await
	}

	/// Pull a file from the server into `save_dir`
	pub async fn fetch_file(&mut self, remote_path: &str, save_dir: &Path) -> TransferResult<ReceivedFile> {
		fetch_file(&mut self.conn, &mut self.buffer, remote_path, save_dir).await
	}

	pub async fn send_message(&mut self, content: &str) -> TransferResult<()> {
		write_msg(&mut self.conn, content).await
	}

	/// Close the write half so the server sees a clean disconnect
	pub async fn close(mut self) -> TransferResult<()> {
		self.conn.shutdown().await?;
		Ok(())
	}

	/// Read commands from `input` and run them until `bye` or end of input.
	///
	/// A failed file push ends the session with the error: the server may be
	/// in the middle of a frame. Failed fetches and messages are reported and
	/// the session goes on, unless the failure left the stream misaligned.
	pub async fn run_interactive<I, O>(mut self, input: I, mut output: O) -> TransferResult<()>
	where
		I: AsyncBufRead + Unpin,
		O: AsyncWrite + Unpin,
	{
		let mut lines = input.lines();
		output.write_all(format!("{}\n", USAGE).as_bytes()).await?;

		loop {
			output.write_all(b"Enter a command:\n> ").await?;
			output.flush().await?;

			let line = match lines.next_line().await? {
				Some(line) => line,
				None => break,
			};

			let report = match Command::parse(&line) {
				Command::Empty => continue,
				Command::Bye => break,
				Command::Help => USAGE.to_string(),
				Command::Invalid(usage) => usage,
				Command::Unknown(order) => format!("Unknown command: {}", order),
				Command::TransferFile(path) => {
					let started = Instant::now();
					match self.transfer_file(&path).await {
						Ok(sent) => transfer_report(&path, &sent, started.elapsed()),
						Err(e) => {
							error!("Transfer of {} failed: {}", path.display(), e);
							let text = format!(
								"Transfer of {} failed: {}, closing connection\n",
								path.display(),
								e
							);
							output.write_all(text.as_bytes()).await?;
							return Err(e);
						}
					}
				}
				Command::FetchFile { remote_path, save_dir } => {
					let started = Instant::now();
					match self.fetch_file(&remote_path, &save_dir).await {
						Ok(received) => format!(
							"Fetched {} into {} ({} bytes) in {:?}",
							remote_path,
							received.path.display(),
							received.size,
							started.elapsed()
						),
						Err(e) if e.is_fatal_for_session() => return Err(e),
						Err(e) => format!("Fetch of {} failed: {}", remote_path, e),
					}
				}
				Command::SendMessage(content) => match self.send_message(&content).await {
					Ok(()) => "Message sent".to_string(),
					Err(e @ TransferError::Io(_)) => return Err(e),
					Err(e) => format!("Sending message failed: {}", e),
				},
			};

			output.write_all(format!("{}\n", report).as_bytes()).await?;
		}

		output.write_all(b"Goodbye!\n").await?;
		output.flush().await?;
		self.close().await
	}
}

fn transfer_report(path: &Path, sent: &SentFile, elapsed: Duration) -> String {
	format!("Transferred {} ({} bytes) in {:?}", path.display(), sent.size, elapsed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_commands() {
		assert_eq!(
			Command::parse("transfer-file /tmp/a.bin"),
			Command::TransferFile(PathBuf::from("/tmp/a.bin"))
		);
		assert_eq!(
			Command::parse("fetch-file report.csv ./downloads"),
			Command::FetchFile {
				remote_path: "report.csv".into(),
				save_dir: PathBuf::from("./downloads"),
			}
		);
		assert_eq!(Command::parse("send-msg hello   big  world"), Command::SendMessage("hello big world".into()));
		assert_eq!(Command::parse("send-msg"), Command::SendMessage(String::new()));
		assert_eq!(Command::parse("bye"), Command::Bye);
		assert_eq!(Command::parse("   "), Command::Empty);
		assert_eq!(Command::parse("dance"), Command::Unknown("dance".into()));
	}

	#[test]
	fn test_parse_missing_arguments() {
		assert!(matches!(Command::parse("transfer-file"), Command::Invalid(_)));
		assert!(matches!(Command::parse("fetch-file only-one"), Command::Invalid(_)));
	}

	#[tokio::test]
	async fn test_interactive_message_and_bye() {
		use crate::protocol::{read_msg, read_packet_tag, PacketType};

		let (client_end, mut server_end) = tokio::io::duplex(1024);
		let session = ClientSession::new(client_end, 16);

		let input: &[u8] = b"send-msg hi there\nwhat\nbye\n";
		let mut output = Vec::new();
		session.run_interactive(input, &mut output).await.unwrap();

		let tag = read_packet_tag(&mut server_end).await.unwrap();
		assert_eq!(tag, PacketType::Message.as_u8());
		assert_eq!(read_msg(&mut server_end).await.unwrap(), "hi there");

		let text = String::from_utf8(output).unwrap();
		assert!(text.contains("Message sent"));
		assert!(text.contains("Unknown command: what"));
		assert!(text.ends_with("Goodbye!\n"));
	}

	#[tokio::test]
	async fn test_interactive_transfer_failure_ends_session() {
		let (client_end, _server_end) = tokio::io::duplex(1024);
		let session = ClientSession::new(client_end, 16);

		let input: &[u8] = b"transfer-file /definitely/not/here.bin\nbye\n";
		let mut output = Vec::new();
		let result = session.run_interactive(input, &mut output).await;
		assert!(matches!(result, Err(TransferError::FileAccess { .. })));
		assert!(!String::from_utf8(output).unwrap().contains("Goodbye!"));
	}
}

// vim: ts=4
