use bytes::Bytes;
use opaldb::config::Config;
use opaldb::connection::ConnectionHandler;
use opaldb::core::persistence::{AofLoader, AppendOnlyFile};
use opaldb::core::state::ServerState;
use opaldb::core::storage::Db;
use opaldb::server::{connection_loop, initialization};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::timeout;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Boots a full server on an ephemeral port with a temp-dir append-only file.
async fn start_server() -> (SocketAddr, Config, TempDir) {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.persistence.aof_path = dir
        .path()
        .join("opaldb.aof")
        .to_str()
        .unwrap()
        .to_string();
    config.persistence.flush_interval = Duration::from_millis(50);

    let ctx = initialization::setup(config.clone()).await.unwrap();
    let addr = ctx.listener.local_addr().unwrap();
    tokio::spawn(connection_loop::run(ctx));
    (addr, config, dir)
}

async fn exchange(stream: &mut TcpStream, request: &[u8], expected: &[u8]) {
    stream.write_all(request).await.unwrap();
    let mut buf = vec![0u8; expected.len()];
    timeout(IO_TIMEOUT, stream.read_exact(&mut buf))
        .await
        .expect("timed out waiting for response")
        .unwrap();
    assert_eq!(
        buf,
        expected,
        "got {:?}, want {:?}",
        String::from_utf8_lossy(&buf),
        String::from_utf8_lossy(expected)
    );
}

#[tokio::test]
async fn test_ping_round_trip() {
    let (addr, _config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    exchange(&mut stream, b"*1\r\n$4\r\nPING\r\n", b"+PONG\r\n").await;
}

#[tokio::test]
async fn test_wrong_arity_returns_error_and_leaves_store_unchanged() {
    let (addr, _config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    exchange(
        &mut stream,
        b"*2\r\n$3\r\nSET\r\n$1\r\nx\r\n",
        b"-ERR wrong number of arguments for 'set' command\r\n",
    )
    .await;
    // The key was never assigned.
    exchange(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\nx\r\n", b"$-1\r\n").await;
}

#[tokio::test]
async fn test_transaction_commit_aggregates_results_and_persists_in_order() {
    let (addr, config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    exchange(&mut stream, b"*1\r\n$5\r\nMULTI\r\n", b"+OK\r\n").await;
    exchange(
        &mut stream,
        b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n",
        b"+QUEUED\r\n",
    )
    .await;
    exchange(
        &mut stream,
        b"*3\r\n$3\r\nSET\r\n$1\r\nb\r\n$1\r\n2\r\n",
        b"+QUEUED\r\n",
    )
    .await;
    // One aggregate array, results in submission order.
    exchange(&mut stream, b"*1\r\n$4\r\nEXEC\r\n", b"*2\r\n+OK\r\n+OK\r\n").await;

    // Nothing reached the log before the commit, and afterwards the records
    // appear byte-exact in submission order.
    let log = tokio::fs::read(&config.persistence.aof_path).await.unwrap();
    assert_eq!(
        log,
        b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n*3\r\n$3\r\nSET\r\n$1\r\nb\r\n$1\r\n2\r\n"
    );

    // Restarting from that log alone reproduces the state.
    let db = Db::new();
    AofLoader::new(config.persistence.clone())
        .replay_into(&db)
        .await
        .unwrap();
    assert_eq!(db.get(b"a"), Some(Bytes::from_static(b"1")));
    assert_eq!(db.get(b"b"), Some(Bytes::from_static(b"2")));
}

#[tokio::test]
async fn test_transaction_discard_has_no_effect() {
    let (addr, config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    exchange(&mut stream, b"*1\r\n$5\r\nMULTI\r\n", b"+OK\r\n").await;
    exchange(
        &mut stream,
        b"*3\r\n$3\r\nSET\r\n$1\r\nq\r\n$1\r\n9\r\n",
        b"+QUEUED\r\n",
    )
    .await;
    exchange(&mut stream, b"*1\r\n$7\r\nDISCARD\r\n", b"+OK\r\n").await;

    exchange(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\nq\r\n", b"$-1\r\n").await;
    let log = tokio::fs::read(&config.persistence.aof_path).await.unwrap();
    assert!(log.is_empty(), "aborted transaction must persist nothing");
}

#[tokio::test]
async fn test_repeated_multi_discards_the_stale_queue() {
    let (addr, config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    exchange(&mut stream, b"*1\r\n$5\r\nMULTI\r\n", b"+OK\r\n").await;
    exchange(
        &mut stream,
        b"*3\r\n$3\r\nSET\r\n$5\r\nstale\r\n$1\r\n1\r\n",
        b"+QUEUED\r\n",
    )
    .await;
    // A second MULTI starts over: the queued SET is gone.
    exchange(&mut stream, b"*1\r\n$5\r\nMULTI\r\n", b"+OK\r\n").await;
    exchange(&mut stream, b"*1\r\n$4\r\nEXEC\r\n", b"*0\r\n").await;

    exchange(&mut stream, b"*2\r\n$3\r\nGET\r\n$5\r\nstale\r\n", b"$-1\r\n").await;
    let log = tokio::fs::read(&config.persistence.aof_path).await.unwrap();
    assert!(log.is_empty(), "discarded queue must persist nothing");
}

#[tokio::test]
async fn test_exec_and_discard_outside_transaction_are_errors() {
    let (addr, _config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    exchange(
        &mut stream,
        b"*1\r\n$4\r\nEXEC\r\n",
        b"-ERR EXEC without MULTI\r\n",
    )
    .await;
    exchange(
        &mut stream,
        b"*1\r\n$7\r\nDISCARD\r\n",
        b"-ERR DISCARD without MULTI\r\n",
    )
    .await;
}

#[tokio::test]
async fn test_non_array_and_empty_requests_are_silently_dropped() {
    let (addr, _config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    // Neither the simple string nor the empty array gets any response; the
    // PING right behind them is answered first.
    stream.write_all(b"+hello\r\n*0\r\n").await.unwrap();
    exchange(&mut stream, b"*1\r\n$4\r\nPING\r\n", b"+PONG\r\n").await;
}

#[tokio::test]
async fn test_unknown_command_gets_neutral_response() {
    let (addr, _config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    exchange(&mut stream, b"*1\r\n$7\r\nCOMMAND\r\n", b"+\r\n").await;
    // The session survives the unknown command.
    exchange(&mut stream, b"*1\r\n$4\r\nPING\r\n", b"+PONG\r\n").await;
}

#[tokio::test]
async fn test_malformed_bulk_length_closes_the_connection_cleanly() {
    let (addr, _config, _dir) = start_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(b"$abc\r\nsixtyo\r\n").await.unwrap();

    // No hang: the server closes the connection instead of replying.
    let mut buf = [0u8; 64];
    let n = timeout(IO_TIMEOUT, stream.read(&mut buf))
        .await
        .expect("timed out waiting for the connection to close")
        .unwrap();
    assert_eq!(n, 0, "expected end-of-stream, got {:?}", &buf[..n]);
}

/// Reads one CRLF-terminated reply line.
async fn read_reply_line(stream: &mut TcpStream) -> Vec<u8> {
    let mut line = Vec::new();
    loop {
        let byte = timeout(IO_TIMEOUT, stream.read_u8())
            .await
            .expect("timed out waiting for a reply line")
            .unwrap();
        line.push(byte);
        if line.ends_with(b"\r\n") {
            return line;
        }
    }
}

// `/dev/full` accepts opens but fails every write with ENOSPC, which makes
// the append path fail after the command has already parsed.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_append_failure_becomes_error_reply_and_session_survives() {
    let aof = AppendOnlyFile::open("/dev/full", Duration::from_secs(3600))
        .await
        .unwrap();
    let state = Arc::new(ServerState {
        config: Config::default(),
        db: Db::new(),
        aof: Some(aof),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, _) = broadcast::channel(1);
    let shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        let (socket, peer) = listener.accept().await.unwrap();
        let mut handler = ConnectionHandler::new(socket, peer, state, 1, shutdown_rx);
        let _ = handler.run().await;
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n")
        .await
        .unwrap();
    let reply = read_reply_line(&mut stream).await;
    assert!(
        reply.starts_with(b"-ERR persistence failure"),
        "got {:?}",
        String::from_utf8_lossy(&reply)
    );

    // The failure stays local to the request: the session keeps serving, and
    // the unpersisted mutation was never applied.
    exchange(&mut stream, b"*1\r\n$4\r\nPING\r\n", b"+PONG\r\n").await;
    exchange(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\na\r\n", b"$-1\r\n").await;
}

#[tokio::test]
async fn test_state_survives_a_restart() {
    let (addr, config, _dir) = start_server().await;
    {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        exchange(
            &mut stream,
            b"*3\r\n$3\r\nSET\r\n$4\r\nname\r\n$4\r\nopal\r\n",
            b"+OK\r\n",
        )
        .await;
        exchange(
            &mut stream,
            b"*4\r\n$4\r\nHSET\r\n$5\r\nusers\r\n$2\r\nu1\r\n$5\r\nalice\r\n",
            b"+OK\r\n",
        )
        .await;
    }

    // A second server over the same log starts with the same data.
    let mut restarted = config.clone();
    restarted.port = 0;
    let ctx = initialization::setup(restarted).await.unwrap();
    let new_addr = ctx.listener.local_addr().unwrap();
    tokio::spawn(connection_loop::run(ctx));

    let mut stream = TcpStream::connect(new_addr).await.unwrap();
    exchange(
        &mut stream,
        b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n",
        b"$4\r\nopal\r\n",
    )
    .await;
    exchange(
        &mut stream,
        b"*3\r\n$4\r\nHGET\r\n$5\r\nusers\r\n$2\r\nu1\r\n",
        b"$5\r\nalice\r\n",
    )
    .await;
}
