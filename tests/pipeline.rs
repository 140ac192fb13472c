//! End-to-end discovery against a mocked HTTP tracker and a local peer.

use rdisc::bencode::{encode, Value};
use rdisc::peer::Handshake;
use rdisc::{
    Discovery, DiscoveryConfig, InfoHash, Metainfo, PeerConfig, PeerError, PeerId, TrackerConfig,
    TrackerError,
};
use sha1::{Digest, Sha1};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REMOTE_ID: [u8; 20] = *b"-TR4040-remotepeer01";

/// Set `RUST_LOG=rdisc=debug` to see the pipeline's logs.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn minimal_torrent(announce: &str) -> Vec<u8> {
    let mut pieces = vec![0x01u8; 20];
    pieces.extend_from_slice(&[0x02u8; 20]);

    let info = Value::dict([
        ("name", Value::string("sample.bin")),
        ("length", Value::Integer(1024)),
        ("piece length", Value::Integer(512)),
        ("pieces", Value::from(pieces.as_slice())),
    ]);
    encode(&Value::dict([
        ("announce", Value::string(announce)),
        ("info", info),
    ]))
}

fn compact(addr: SocketAddr) -> Vec<u8> {
    let SocketAddr::V4(v4) = addr else {
        panic!("expected an IPv4 address");
    };
    let mut entry = v4.ip().octets().to_vec();
    entry.extend_from_slice(&v4.port().to_be_bytes());
    entry
}

fn announce_body(peers: &[u8]) -> Vec<u8> {
    let mut body = format!("d8:intervali1800e5:peers{}:", peers.len()).into_bytes();
    body.extend_from_slice(peers);
    body.push(b'e');
    body
}

fn test_config() -> DiscoveryConfig {
    DiscoveryConfig {
        tracker: TrackerConfig {
            http_timeout_ms: 2000,
            ..TrackerConfig::default()
        },
        peer: PeerConfig {
            connect_timeout_ms: 1000,
            read_timeout_ms: 1000,
            ..PeerConfig::default()
        },
        ..DiscoveryConfig::default()
    }
}

/// A peer that answers one handshake for `info_hash`.
async fn spawn_peer(info_hash: [u8; 20]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut theirs = [0u8; 68];
        stream.read_exact(&mut theirs).await.unwrap();
        let reply = Handshake::new(info_hash, REMOTE_ID).encode();
        stream.write_all(&reply).await.unwrap();
        let _ = stream.read(&mut [0u8; 1]).await;
    });

    addr
}

#[tokio::test]
async fn minimal_torrent_yields_one_peer() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ann"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(b"d5:peers6:\x7f\x00\x00\x01\x1a\xe1e".to_vec()),
        )
        .mount(&server)
        .await;

    let data = minimal_torrent(&format!("{}/ann", server.uri()));
    let metainfo = Metainfo::from_bytes(&data).unwrap();

    assert_eq!(metainfo.total_length(), 1024);
    assert_eq!(metainfo.piece_hashes().len(), 2);

    let again = Metainfo::from_bytes(&data).unwrap();
    assert_eq!(metainfo.info_hash, again.info_hash);
    let digest: [u8; 20] = Sha1::digest(metainfo.raw_info()).into();
    assert_eq!(metainfo.info_hash, InfoHash(digest));

    let discovery = Discovery::new(test_config());
    let summary = discovery
        .announce(&metainfo, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.peers, vec!["127.0.0.1:6881".parse().unwrap()]);
    assert_eq!(summary.responses[0].1.interval, None);
}

#[tokio::test]
async fn run_connects_to_announced_peers() {
    init_tracing();
    let server = MockServer::start().await;
    let data = minimal_torrent(&format!("{}/ann", server.uri()));
    let metainfo = Metainfo::from_bytes(&data).unwrap();

    let good = spawn_peer(*metainfo.info_hash.as_bytes()).await;
    let wrong = spawn_peer([0xEE; 20]).await;
    let closed = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let mut peers = compact(good);
    peers.extend(compact(wrong));
    peers.extend(compact(closed));
    Mock::given(method("GET"))
        .and(path("/ann"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(announce_body(&peers)))
        .mount(&server)
        .await;

    let our_id = PeerId::generate();
    let discovery = Discovery::with_peer_id(test_config(), our_id);
    assert_eq!(discovery.peer_id(), &our_id);

    let report = discovery
        .run(&metainfo, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.announce.peers.len(), 3);
    assert_eq!(report.connected.len(), 1);
    assert_eq!(report.connected[0].addr, good);
    assert_eq!(report.connected[0].peer_id, PeerId(REMOTE_ID));

    assert_eq!(report.failed.len(), 2);
    assert!(matches!(report.failed[0], PeerError::Mismatch { addr } if addr == wrong));
    assert!(matches!(report.failed[1], PeerError::Unreachable { addr, .. } if addr == closed));
}

#[tokio::test]
async fn run_fails_when_tracker_rejects() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"d14:failure reason12:unregisterede".to_vec()),
        )
        .mount(&server)
        .await;

    let url = format!("{}/ann", server.uri());
    let metainfo = Metainfo::from_bytes(&minimal_torrent(&url)).unwrap();
    let discovery = Discovery::new(test_config());

    match discovery.run(&metainfo, &CancellationToken::new()).await {
        Err(TrackerError::AllFailed(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(matches!(
                &errors[0],
                TrackerError::Failure { url: u, reason } if *u == url && reason == "unregistered"
            ));
        }
        other => panic!("expected tracker failure, got {:?}", other.map(|r| r.connected)),
    }
}
