//! # lan-transfer - File Transfer and Messaging over a Single TCP Connection
//!
//! A server accepts any number of clients; each client pushes files, pulls
//! files, and sends text messages over one persistent connection using a small
//! binary protocol (see [`protocol`]).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lan_transfer::{ServerConfig, Server, events::TracingSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig { port: 9000, ..Default::default() };
//!     Server::bind(&config, Arc::new(TracingSink)).await?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Client Side
//!
//! ```rust,ignore
//! use lan_transfer::client::ClientSession;
//!
//! let mut session = ClientSession::connect("192.168.1.20:9000", 1024 * 1024).await?;
//! session.transfer_file("notes.txt".as_ref()).await?;
//! session.send_message("done").await?;
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod logging;
pub mod protocol;
pub mod serve;
pub mod validation;

// Re-export commonly used types and functions
pub use config::{ClientConfig, ServerConfig};
pub use error::{TransferError, TransferResult};
pub use serve::Server;

// vim: ts=4
