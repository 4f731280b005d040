//! Wire format and HTTP delivery against a one-shot mock ingestion server.

mod common;

use common::write_file;
use filededup::engine::{BatchSink, DeliveryError, HttpBatchSink, encode_batch};
use filededup::{FileRecord, ScanOpts, scan_and_send};
use flate2::read::GzDecoder;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Captured request: header block (request line + headers) and raw body.
type Captured = (String, Vec<u8>);

/// Accept one connection, capture the request, answer with `response` verbatim.
fn serve_once(response: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut head = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }
        let len = head
            .lines()
            .find_map(|l| {
                let (k, v) = l.split_once(':')?;
                k.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| v.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).unwrap();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        (head, body)
    });
    (format!("http://{}", addr), handle)
}

const NO_CONTENT: &str = "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n";
const SERVER_ERROR: &str = "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
const CREATED: &str = "HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

fn sample_record() -> FileRecord {
    FileRecord {
        machine_id: "box-1".to_string(),
        path: "/data/photos".to_string(),
        filename: "cat.jpg".to_string(),
        size: 1234,
        modification_time: "2024-03-01T12:30:45Z".parse().unwrap(),
        hash: "ab".repeat(32),
    }
}

fn gunzip_json(body: &[u8]) -> serde_json::Value {
    let mut json = String::new();
    GzDecoder::new(body).read_to_string(&mut json).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_encode_batch_wire_shape() {
    let body = encode_batch(&[sample_record(), sample_record()]).unwrap();
    let value = gunzip_json(&body);
    let arr = value.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    let obj = arr[0].as_object().unwrap();
    assert_eq!(obj["machine_id"], "box-1");
    assert_eq!(obj["path"], "/data/photos");
    assert_eq!(obj["filename"], "cat.jpg");
    assert_eq!(obj["size"], 1234);
    assert_eq!(obj["mtime"], "2024-03-01T12:30:45Z");
    assert_eq!(obj["hash"], "ab".repeat(32));
    assert!(!obj.contains_key("modification_time"));
}

#[test]
fn test_encode_batch_round_trips_records() {
    let body = encode_batch(&[sample_record()]).unwrap();
    let mut json = String::new();
    GzDecoder::new(body.as_slice()).read_to_string(&mut json).unwrap();
    let back: Vec<FileRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, vec![sample_record()]);
}

#[test]
fn test_http_sink_posts_gzip_json() {
    let (base, server) = serve_once(NO_CONTENT);
    let sink = HttpBatchSink::new(format!("{base}/files"), Duration::from_secs(10));
    sink.send_batch(&[sample_record()]).unwrap();

    let (head, body) = server.join().unwrap();
    assert!(head.starts_with("POST /files HTTP/1.1"), "{head}");
    let lower = head.to_ascii_lowercase();
    assert!(lower.contains("content-encoding: gzip"));
    assert!(lower.contains("content-type: application/json"));
    assert_eq!(gunzip_json(&body)[0]["filename"], "cat.jpg");
}

#[test]
fn test_http_sink_rejects_error_status() {
    let (base, server) = serve_once(SERVER_ERROR);
    let sink = HttpBatchSink::new(format!("{base}/files"), Duration::from_secs(10));
    let err = sink.send_batch(&[sample_record()]).unwrap_err();
    assert!(matches!(err, DeliveryError::Status(500)), "{err}");
    server.join().unwrap();
}

#[test]
fn test_http_sink_only_accepts_204() {
    let (base, server) = serve_once(CREATED);
    let sink = HttpBatchSink::new(format!("{base}/files"), Duration::from_secs(10));
    let err = sink.send_batch(&[sample_record()]).unwrap_err();
    assert!(matches!(err, DeliveryError::Status(201)), "{err}");
    server.join().unwrap();
}

#[test]
fn test_http_sink_transport_error() {
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let sink = HttpBatchSink::new(format!("http://127.0.0.1:{port}/files"), Duration::from_secs(5));
    let err = sink.send_batch(&[sample_record()]).unwrap_err();
    assert!(matches!(err, DeliveryError::Transport(_)), "{err}");
}

#[test]
fn test_scan_and_send_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"alpha");
    write_file(&dir.path().join("b.txt"), b"alpha");

    let (base, server) = serve_once(NO_CONTENT);
    let opts = ScanOpts {
        server_url: format!("{base}/"),
        machine_id: "e2e".to_string(),
        batch_size: 10,
        workers: 2,
        ..ScanOpts::default()
    };
    let summary = scan_and_send(dir.path(), &opts).unwrap();
    assert_eq!(summary.batches_sent, 1);
    assert_eq!(summary.records_sent, 2);

    let (head, body) = server.join().unwrap();
    assert!(head.starts_with("POST /files "), "{head}");
    let value = gunzip_json(&body);
    let arr = value.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["hash"], arr[1]["hash"]);
    assert_eq!(arr[0]["machine_id"], "e2e");
}
