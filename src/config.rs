//! Runtime configuration
//!
//! There are no config files. Values come from built-in defaults, overridden by
//! command line flags or answers to the interactive prompts.

use std::path::PathBuf;

use crate::protocol::DEFAULT_BUFFER_SIZE;

/// Name of the storage directory created under the working directory
pub const DEFAULT_STORAGE_DIR: &str = "data";

/// Server-side settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
	/// TCP port to listen on (0 picks a free port)
	pub port: u16,

	/// Address to bind; all interfaces by default
	pub bind_host: String,

	/// Where received files are stored and fetched files are looked up
	pub storage_dir: PathBuf,

	/// Size of the per-connection transfer buffer
	pub buffer_size: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			port: 0,
			bind_host: "0.0.0.0".to_string(),
			storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
			buffer_size: DEFAULT_BUFFER_SIZE,
		}
	}
}

impl ServerConfig {
	/// `host:port` string to bind
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.bind_host, self.port)
	}
}

/// Client-side settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// `host:port` of the server
	pub address: String,

	/// Size of the session's transfer buffer
	pub buffer_size: usize,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self { address: String::new(), buffer_size: DEFAULT_BUFFER_SIZE }
	}
}

/// Parse a port typed by the operator. Port 0 is not accepted here.
pub fn parse_port(input: &str) -> Option<u16> {
	match input.trim().parse::<u16>() {
		Ok(0) | Err(_) => None,
		Ok(port) => Some(port),
	}
}


// vim: ts=4
