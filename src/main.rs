use clap::{Arg, Command};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

use lan_transfer::client::ClientSession;
use lan_transfer::config::{parse_port, ClientConfig, ServerConfig};
use lan_transfer::events::TracingSink;
use lan_transfer::logging::{self, *};
use lan_transfer::Server;

///////////////////////
// Utility functions //
///////////////////////

/// Print `prompt` and read one line; `None` at end of input
async fn input(reader: &mut BufReader<Stdin>, prompt: &str) -> Result<Option<String>, Box<dyn Error>> {
	let mut stdout = tokio::io::stdout();
	stdout.write_all(format!("{}\n> ", prompt).as_bytes()).await?;
	stdout.flush().await?;

	let mut line = String::new();
	if reader.read_line(&mut line).await? == 0 {
		return Ok(None);
	}
	Ok(Some(line.trim().to_string()))
}

async fn run_server(mut config: ServerConfig, port: Option<u16>) -> Result<(), Box<dyn Error>> {
	config.port = match port {
		Some(port) => port,
		None => {
			let mut reader = BufReader::new(tokio::io::stdin());
			loop {
				let answer = input(&mut reader, "Enter the port to listen on:")
					.await?
					.ok_or("no port given")?;
				match parse_port(&answer) {
					Some(port) => break port,
					None => println!("Invalid port: {}", answer),
				}
			}
		}
	};

	let server = Server::bind(&config, Arc::new(TracingSink)).await?;
	info!("Storing files in {}", server.storage_dir().display());
	server.run().await?;
	Ok(())
}

async fn run_client(config: ClientConfig) -> Result<(), Box<dyn Error>> {
	let mut reader = BufReader::new(tokio::io::stdin());

	let session = if config.address.is_empty() {
		loop {
			let address = input(&mut reader, "Enter the server address (host:port):")
				.await?
				.ok_or("no server address given")?;
			match ClientSession::connect(&address, config.buffer_size).await {
				Ok(session) => break session,
				Err(e) => println!("Cannot connect to {}: {}", address, e),
			}
		}
	} else {
		ClientSession::connect(&config.address, config.buffer_size).await?
	};
	println!("Connected!");

	session.run_interactive(reader, tokio::io::stdout()).await?;
	Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	logging::init_tracing();

	let buffer_arg = Arg::new("buffer-size")
		.long("buffer-size")
		.value_name("BYTES")
		.value_parser(clap::value_parser!(usize))
		.help("Transfer buffer size in bytes (default 1 MiB)");

	let matches = Command::new("lan-transfer")
		.version(env!("CARGO_PKG_VERSION"))
		.about("LAN file transfer and messaging")
		.subcommand_required(true)
		.subcommand(
			Command::new("server")
				.about("Accept client connections and store received files")
				.arg(
					Arg::new("port")
						.short('p')
						.long("port")
						.value_name("PORT")
						.value_parser(clap::value_parser!(u16).range(1..))
						.help("TCP port to listen on (prompted if omitted)"),
				)
				.arg(
					Arg::new("data")
						.short('d')
						.long("data")
						.value_name("DIR")
						.help("Storage directory (default ./data)"),
				)
				.arg(buffer_arg.clone()),
		)
		.subcommand(
			Command::new("client")
				.about("Connect to a server and issue commands interactively")
				.arg(
					Arg::new("address")
						.short('a')
						.long("address")
						.value_name("HOST:PORT")
						.help("Server address (prompted if omitted)"),
				)
				.arg(buffer_arg),
		)
		.get_matches();

	if let Some(matches) = matches.subcommand_matches("server") {
		let mut config = ServerConfig::default();
		if let Some(dir) = matches.get_one::<String>("data") {
			config.storage_dir = PathBuf::from(dir);
		}
		if let Some(size) = matches.get_one::<usize>("buffer-size") {
			config.buffer_size = *size;
		}
		run_server(config, matches.get_one::<u16>("port").copied()).await?;
	} else if let Some(matches) = matches.subcommand_matches("client") {
		let mut config = ClientConfig::default();
		if let Some(address) = matches.get_one::<String>("address") {
			config.address = address.clone();
		}
		if let Some(size) = matches.get_one::<usize>("buffer-size") {
			config.buffer_size = *size;
		}
		run_client(config).await?;
	}

	Ok(())
}

// vim: ts=4
