//! Integration tests for the gateway's observable behavior against the
//! in-process `mem://` backend: connection lifecycle, round-trips,
//! rename/delete visibility, and the upload/download path.

use std::io::Write;

use gatefs::api::{GatewayError, RemoteFileGateway};

const ENDPOINT: &str = "mem://localhost:9000";

fn connected() -> RemoteFileGateway {
    let mut gw = RemoteFileGateway::new();
    gw.connect(ENDPOINT, "hadoop").unwrap();
    gw
}

#[test]
fn disconnect_leaves_gateway_unusable() {
    let mut gw = connected();
    gw.create_file("/a.txt", b"x").unwrap();

    gw.disconnect();
    assert!(!gw.is_connected());

    assert!(matches!(
        gw.create_file("/b.txt", b"y"),
        Err(GatewayError::NotConnected)
    ));
    assert!(matches!(
        gw.read_file("/a.txt"),
        Err(GatewayError::NotConnected)
    ));
    assert!(matches!(gw.list("/"), Err(GatewayError::NotConnected)));
}

#[test]
fn create_read_round_trip() {
    let gw = connected();
    gw.mkdir("/d").unwrap();
    gw.create_file("/d/a.txt", b"hello").unwrap();

    let bytes = gw.read_file("/d/a.txt").unwrap().read_to_vec().unwrap();
    assert_eq!(bytes, b"hello");
}

#[test]
fn rename_changes_listing() {
    let gw = connected();
    gw.mkdir("/d").unwrap();
    gw.create_file("/d/a.txt", b"x").unwrap();

    gw.rename("/d/a.txt", "/d/b.txt").unwrap();

    let names: Vec<String> = gw
        .list("/d")
        .unwrap()
        .into_iter()
        .map(|e| e.path)
        .collect();
    assert!(!names.contains(&"/d/a.txt".to_string()));
    assert!(names.contains(&"/d/b.txt".to_string()));
}

#[test]
fn delete_respects_recursive_flag() {
    let gw = connected();
    gw.mkdir("/d").unwrap();
    gw.create_file("/d/a.txt", b"x").unwrap();

    assert!(matches!(
        gw.delete("/d", false),
        Err(GatewayError::DirectoryNotEmpty(_))
    ));

    gw.delete("/d", true).unwrap();
    let names: Vec<String> = gw.list("/").unwrap().into_iter().map(|e| e.path).collect();
    assert!(!names.contains(&"/d".to_string()));
}

#[test]
fn delete_absent_path_is_an_error() {
    let gw = connected();
    assert!(matches!(
        gw.delete("/nope", false),
        Err(GatewayError::NotFound(_))
    ));
    assert!(matches!(
        gw.delete("/nope", true),
        Err(GatewayError::NotFound(_))
    ));
}

#[test]
fn upload_download_round_trip() {
    let gw = connected();
    gw.mkdir("/up").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("payload.bin");
    let content: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::File::create(&local)
        .unwrap()
        .write_all(&content)
        .unwrap();

    let mut ticks = 0usize;
    let mut on_progress = || ticks += 1;
    gw.upload_local_file(&local, "/up", Some(&mut on_progress))
        .unwrap();
    // 20000 bytes at the default 4096-byte chunk size: five chunks
    assert!(ticks >= 1);

    let entry = gw.stat("/up/payload.bin").unwrap();
    assert_eq!(entry.len, content.len() as u64);
    assert!(!entry.is_dir);
    assert!(entry.replication >= 1);

    let fetched = dir.path().join("fetched.bin");
    gw.download_remote_file("/up/payload.bin", &fetched).unwrap();
    assert_eq!(std::fs::read(&fetched).unwrap(), content);
}

#[test]
fn upload_without_progress_sink() {
    let gw = connected();
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("h.txt");
    std::fs::write(&local, b"hello").unwrap();

    gw.upload_local_file(&local, "/", None).unwrap();
    let bytes = gw.read_file("/h.txt").unwrap().read_to_vec().unwrap();
    assert_eq!(bytes, b"hello");
}

#[test]
fn upload_failures() {
    let gw = connected();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");

    assert!(matches!(
        gw.upload_local_file(&missing, "/", None),
        Err(GatewayError::LocalIo { .. })
    ));

    let local = dir.path().join("h.txt");
    std::fs::write(&local, b"hello").unwrap();
    assert!(matches!(
        gw.upload_local_file(&local, "/no-such-dir", None),
        Err(GatewayError::Path(_))
    ));
}

#[test]
fn download_failures() {
    let gw = connected();
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        gw.download_remote_file("/nope", &dir.path().join("out")),
        Err(GatewayError::NotFound(_))
    ));

    gw.create_file("/a.txt", b"x").unwrap();
    let unwritable = dir.path().join("no-such-parent").join("out");
    assert!(matches!(
        gw.download_remote_file("/a.txt", &unwritable),
        Err(GatewayError::LocalIo { .. })
    ));
}

#[test]
fn empty_directory_lists_empty() {
    let gw = connected();
    gw.mkdir("/fresh").unwrap();
    assert!(gw.list("/fresh").unwrap().is_empty());
}

#[test]
fn example_scenario() {
    // connect -> create -> read -> delete -> list, end to end
    let mut gw = RemoteFileGateway::new();
    gw.connect("mem://host:1234", "user").unwrap();

    gw.mkdir("/d").unwrap();
    gw.create_file("/d/a.txt", b"hello").unwrap();

    let bytes = gw.read_file("/d/a.txt").unwrap().read_to_vec().unwrap();
    assert_eq!(bytes, b"hello");

    gw.delete("/d/a.txt", false).unwrap();
    assert!(gw.list("/d").unwrap().is_empty());

    gw.disconnect();
    assert!(matches!(gw.list("/d"), Err(GatewayError::NotConnected)));
}

#[test]
fn listing_reports_entry_metadata() {
    let gw = connected();
    gw.mkdir("/meta").unwrap();
    gw.mkdir("/meta/sub").unwrap();
    gw.create_file("/meta/a.txt", b"abcdef").unwrap();

    let entries = gw.list("/meta").unwrap();
    assert_eq!(entries.len(), 2);

    let file = entries.iter().find(|e| e.path == "/meta/a.txt").unwrap();
    assert!(!file.is_dir);
    assert_eq!(file.len, 6);
    assert!(file.replication >= 1);

    let sub = entries.iter().find(|e| e.path == "/meta/sub").unwrap();
    assert!(sub.is_dir);
    assert_eq!(sub.replication, 0);
}
