//! TCP server: accept loop and per-connection workers

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fs};

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::TransferResult;
use crate::events::EventSink;
use crate::logging::*;

/// Make sure `dir` exists and is a directory; relative paths are taken from
/// the working directory. Returns the absolute path.
pub fn prepare_storage_dir(dir: &Path) -> io::Result<PathBuf> {
	let dir = if dir.is_absolute() { dir.to_path_buf() } else { env::current_dir()?.join(dir) };

	match fs::metadata(&dir) {
		Ok(meta) if meta.is_dir() => Ok(dir),
		Ok(_) => Err(io::Error::new(
			io::ErrorKind::AlreadyExists,
			format!("{} exists, but it is not a directory", dir.display()),
		)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => {
			fs::create_dir_all(&dir)?;
			Ok(dir)
		}
		Err(e) => Err(e),
	}
}

/// A bound listener plus what every connection worker needs
pub struct Server {
	listener: TcpListener,
	storage_dir: PathBuf,
	buffer_size: usize,
	sink: Arc<dyn EventSink>,
}

impl Server {
	/// Prepare the storage directory and bind the listening socket
	pub async fn bind(config: &ServerConfig, sink: Arc<dyn EventSink>) -> TransferResult<Self> {
		let storage_dir = prepare_storage_dir(&config.storage_dir)?;
		let listener = TcpListener::bind(config.bind_address()).await?;
		Ok(Self { listener, storage_dir, buffer_size: config.buffer_size, sink })
	}

	pub fn local_addr(&self) -> io::Result<SocketAddr> {
		self.listener.local_addr()
	}

	pub fn storage_dir(&self) -> &Path {
		&self.storage_dir
	}

	/// Accept connections forever, one task per connection.
	///
	/// Workers share nothing but the sink and the storage path; a failing
	/// connection never affects the others or the accept loop.
	pub async fn run(self) -> TransferResult<()> {
		info!("Waiting for client connections on {}...", self.listener.local_addr()?);

		loop {
			let (mut stream, addr) = match self.listener.accept().await {
				Ok(conn) => conn,
				Err(e) => {
					warn!("Failed to accept connection: {}", e);
					continue;
				}
			};

			if let Err(e) = stream.set_nodelay(true) {
				debug!("({}) cannot set TCP_NODELAY: {}", addr, e);
			}

			let mut dispatcher = Dispatcher::new(
				addr.to_string(),
				self.storage_dir.clone(),
				self.buffer_size,
				Arc::clone(&self.sink),
			);
			tokio::spawn(async move {
				if let Err(e) = dispatcher.run(&mut stream).await {
					debug!("({}) worker finished with error: {}", addr, e);
				}
			});
		}
	}
}


// vim: ts=4
