//! End-to-end tests over loopback TCP
//!
//! A real server is bound on 127.0.0.1:0 with a temporary storage directory and
//! a recording event sink; clients talk to it through the public API.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use lan_transfer::client::ClientSession;
use lan_transfer::events::{RecordingSink, TransferEvent};
use lan_transfer::protocol::{
	read_packet_tag, receive_file, send_file, PacketType, TransferBuffer,
};
use lan_transfer::{Server, ServerConfig, TransferError};

const BUFFER_SIZE: usize = 64;

// ============================================================================
// Helper Functions
// ============================================================================

async fn start_server(storage: &TempDir) -> (String, Arc<RecordingSink>) {
	let config = ServerConfig {
		port: 0,
		bind_host: "127.0.0.1".to_string(),
		storage_dir: storage.path().to_path_buf(),
		buffer_size: BUFFER_SIZE,
	};
	let sink = Arc::new(RecordingSink::new());
	let server = Server::bind(&config, sink.clone()).await.unwrap();
	let addr = server.local_addr().unwrap().to_string();
	tokio::spawn(server.run());
	(addr, sink)
}

/// Poll the sink until `count` events match, or fail after a few seconds
async fn wait_for<F>(sink: &RecordingSink, count: usize, pred: F) -> Vec<TransferEvent>
where
	F: Fn(&TransferEvent) -> bool,
{
	for _ in 0..500 {
		let matching: Vec<_> = sink.events().into_iter().filter(|e| pred(e)).collect();
		if matching.len() >= count {
			return matching;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	panic!("timed out waiting for {} events, got {:?}", count, sink.events());
}

fn is_received(name: &str) -> impl Fn(&TransferEvent) -> bool + '_ {
	move |e: &TransferEvent| matches!(e, TransferEvent::FileReceived { path, .. } if path.ends_with(name))
}

fn patterned(len: usize, seed: u8) -> Vec<u8> {
	(0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

fn create_file(dir: &Path, name: &str, content: &[u8]) {
	fs::write(dir.join(name), content).unwrap();
}

// ============================================================================
// Round trips
// ============================================================================

#[tokio::test]
async fn test_send_receive_loopback_chunk_boundaries() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let src = TempDir::new().unwrap();
	let dst = TempDir::new().unwrap();

	let sizes = [0usize, 1, BUFFER_SIZE, BUFFER_SIZE + 1];
	for (i, size) in sizes.iter().enumerate() {
		create_file(src.path(), &format!("file-{}.bin", i), &patterned(*size, i as u8));
	}

	let dst_path = dst.path().to_path_buf();
	let receiver = tokio::spawn(async move {
		let (mut conn, _) = listener.accept().await.unwrap();
		let mut buffer = TransferBuffer::new(BUFFER_SIZE);
		let mut received = Vec::new();
		for _ in 0..sizes.len() {
			let tag = read_packet_tag(&mut conn).await.unwrap();
			assert_eq!(tag, PacketType::FileTransfer.as_u8());
			received.push(receive_file(&mut conn, &mut buffer, &dst_path).await.unwrap());
		}
		received
	});

	let mut conn = TcpStream::connect(addr).await.unwrap();
	let mut buffer = TransferBuffer::new(BUFFER_SIZE);
	for i in 0..sizes.len() {
		let path = src.path().join(format!("file-{}.bin", i));
		let sent = send_file(&mut conn, &mut buffer, &path).await.unwrap();
		assert_eq!(sent.name, format!("file-{}.bin", i));
	}

	let received = receiver.await.unwrap();
	for (i, size) in sizes.iter().enumerate() {
		let name = format!("file-{}.bin", i);
		assert_eq!(received[i].path, dst.path().join(&name));
		assert_eq!(received[i].size, *size as u64);
		assert_eq!(fs::read(dst.path().join(&name)).unwrap(), patterned(*size, i as u8));
	}
}

#[tokio::test]
async fn test_push_file_to_server() {
	let storage = TempDir::new().unwrap();
	let local = TempDir::new().unwrap();
	let (addr, sink) = start_server(&storage).await;

	let content = patterned(BUFFER_SIZE * 5 + 3, 7);
	create_file(local.path(), "photo.jpg", &content);

	let mut session = ClientSession::connect(&addr, BUFFER_SIZE).await.unwrap();
	let sent = session.transfer_file(&local.path().join("photo.jpg")).await.unwrap();
	assert_eq!(sent.size, content.len() as u64);

	wait_for(&sink, 1, is_received("photo.jpg")).await;
	assert_eq!(fs::read(storage.path().join("photo.jpg")).unwrap(), content);
}

#[tokio::test]
async fn test_message_reaches_server() {
	let storage = TempDir::new().unwrap();
	let (addr, sink) = start_server(&storage).await;

	let mut session = ClientSession::connect(&addr, BUFFER_SIZE).await.unwrap();
	session.send_message("").await.unwrap();
	session.send_message("hello from the client ✓").await.unwrap();

	let messages = wait_for(&sink, 2, |e| matches!(e, TransferEvent::MessageReceived { .. })).await;
	let contents: Vec<_> = messages
		.into_iter()
		.map(|e| match e {
			TransferEvent::MessageReceived { content, .. } => content,
			_ => unreachable!(),
		})
		.collect();
	assert_eq!(contents, vec!["".to_string(), "hello from the client ✓".to_string()]);
}

// ============================================================================
// Fetch
// ============================================================================

#[tokio::test]
async fn test_fetch_success() {
	let storage = TempDir::new().unwrap();
	let local = TempDir::new().unwrap();
	let content = b"id,amount\n1,10\n2,20\n".repeat(20);
	create_file(storage.path(), "report.csv", &content);
	let (addr, _sink) = start_server(&storage).await;

	let mut session = ClientSession::connect(&addr, BUFFER_SIZE).await.unwrap();
	let fetched = session.fetch_file("some/remote/dir/report.csv", local.path()).await.unwrap();

	assert_eq!(fetched.path, local.path().join("report.csv"));
	assert_eq!(fetched.size, content.len() as u64);
	assert_eq!(fs::read(&fetched.path).unwrap(), content);
}

#[tokio::test]
async fn test_fetch_missing_is_remote_error() {
	let storage = TempDir::new().unwrap();
	let local = TempDir::new().unwrap();
	let (addr, sink) = start_server(&storage).await;

	let mut session = ClientSession::connect(&addr, BUFFER_SIZE).await.unwrap();
	match session.fetch_file("missing.csv", local.path()).await {
		Err(TransferError::Remote(msg)) => assert!(msg.contains("missing.csv"), "{}", msg),
		other => panic!("expected remote error, got {:?}", other),
	}
	assert!(!local.path().join("missing.csv").exists());

	// Session is still usable afterwards
	create_file(storage.path(), "late.txt", b"arrived later");
	let fetched = session.fetch_file("late.txt", local.path()).await.unwrap();
	assert_eq!(fs::read(fetched.path).unwrap(), b"arrived later");

	wait_for(&sink, 1, |e| matches!(e, TransferEvent::FetchRejected { .. })).await;
}

// ============================================================================
// Connection isolation
// ============================================================================

#[tokio::test]
async fn test_unknown_tag_closes_only_that_connection() {
	let storage = TempDir::new().unwrap();
	let local = TempDir::new().unwrap();
	let (addr, sink) = start_server(&storage).await;

	let mut good = ClientSession::connect(&addr, BUFFER_SIZE).await.unwrap();
	good.send_message("before").await.unwrap();

	let mut bad = TcpStream::connect(&addr).await.unwrap();
	bad.write_all(&[0x09]).await.unwrap();

	wait_for(&sink, 1, |e| matches!(e, TransferEvent::UnknownPacket { tag: 9, .. })).await;

	// The server closed the bad connection
	let mut byte = [0u8; 1];
	match tokio::time::timeout(Duration::from_secs(5), bad.read(&mut byte)).await {
		Ok(Ok(0)) | Ok(Err(_)) => {}
		other => panic!("expected closed connection, got {:?}", other),
	}

	// The other connection keeps working
	create_file(local.path(), "after.txt", b"still alive");
	good.transfer_file(&local.path().join("after.txt")).await.unwrap();
	wait_for(&sink, 1, is_received("after.txt")).await;
	assert_eq!(fs::read(storage.path().join("after.txt")).unwrap(), b"still alive");
}

#[tokio::test]
async fn test_concurrent_clients_distinct_files() {
	const CLIENTS: usize = 8;

	let storage = TempDir::new().unwrap();
	let local = TempDir::new().unwrap();
	let (addr, sink) = start_server(&storage).await;

	for i in 0..CLIENTS {
		create_file(local.path(), &format!("client-{}.dat", i), &patterned(BUFFER_SIZE * 40 + i, i as u8));
	}

	let mut tasks = tokio::task::JoinSet::new();
	for i in 0..CLIENTS {
		let addr = addr.clone();
		let path = local.path().join(format!("client-{}.dat", i));
		tasks.spawn(async move {
			let mut session = ClientSession::connect(&addr, BUFFER_SIZE).await.unwrap();
			session.transfer_file(&path).await.unwrap();
			session.close().await.unwrap();
		});
	}
	while let Some(result) = tasks.join_next().await {
		result.unwrap();
	}

	wait_for(&sink, CLIENTS, |e| matches!(e, TransferEvent::FileReceived { .. })).await;
	for i in 0..CLIENTS {
		let stored = fs::read(storage.path().join(format!("client-{}.dat", i))).unwrap();
		assert_eq!(stored, patterned(BUFFER_SIZE * 40 + i, i as u8));
	}
}

// vim: ts=4
