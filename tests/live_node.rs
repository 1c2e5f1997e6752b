//! Round trips against a real node.
//!
//! A node must be running and reachable at `IPFS_API_URL` (default
//! http://127.0.0.1:5001). Run with `cargo test -- --ignored`.

use ipfs_rpc_client::NodeConfig;
use std::io::Read;

#[test]
#[ignore = "needs a running node"]
fn add_then_cat_returns_same_bytes() {
    let client = NodeConfig::from_env().connect().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.txt");
    std::fs::write(&path, "test for file").unwrap();

    let result = client.add(&path).unwrap();
    assert_eq!(result.name, "test.txt");
    assert!(!result.hash.is_empty());

    let mut content = Vec::new();
    client.cat(&result.hash).unwrap().read_to_end(&mut content).unwrap();
    assert_eq!(content, b"test for file");
}

#[test]
#[ignore = "needs a running node"]
fn same_bytes_give_same_cid() {
    let client = NodeConfig::from_env().connect().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.txt");
    std::fs::write(&path, "test for file").unwrap();

    let from_file = client.add(&path).unwrap();
    let from_stream = client
        .add_binary(&mut std::io::Cursor::new(b"test for file".to_vec()), "test.txt")
        .unwrap();
    assert_eq!(from_file.hash, from_stream.hash);
}

#[test]
#[ignore = "needs a running node"]
fn add_directory_reports_each_file() {
    let client = NodeConfig::from_env().connect().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("test1"), "Hello 1").unwrap();
    std::fs::write(dir.path().join("test2"), "Hello 2").unwrap();

    let results = client.add_all(dir.path()).unwrap();
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"test1"));
    assert!(names.contains(&"test2"));
}
