//! Minimal one-shot HTTP server for exercising the blocking client offline.
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct Stub {
    pub base_url: String,
    pub requests: Receiver<String>,
    pub handle: JoinHandle<()>,
}

pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }
}

fn read_head(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn respond(stream: &mut TcpStream, reply: &Reply) {
    thread::sleep(reply.delay);
    let resp = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(resp.as_bytes());
}

/// Serve `replies` to consecutive connections, then stop.
pub fn serve(replies: Vec<Reply>) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/v1/", listener.local_addr().unwrap());
    let (tx, requests) = mpsc::channel();
    let handle = thread::spawn(move || {
        for reply in replies {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let _ = tx.send(read_head(&mut stream));
            respond(&mut stream, &reply);
        }
    });
    Stub {
        base_url,
        requests,
        handle,
    }
}

/// Serve `n` connections concurrently, choosing each reply from the request head.
pub fn serve_concurrent(n: usize, pick: fn(&str) -> Reply) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/v1/", listener.local_addr().unwrap());
    let (tx, requests) = mpsc::channel();
    let handle = thread::spawn(move || {
        let mut workers = Vec::new();
        for _ in 0..n {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let tx = tx.clone();
            workers.push(thread::spawn(move || {
                let head = read_head(&mut stream);
                let reply = pick(&head);
                let _ = tx.send(head);
                respond(&mut stream, &reply);
            }));
        }
        for w in workers {
            let _ = w.join();
        }
    });
    Stub {
        base_url,
        requests,
        handle,
    }
}

pub const TWO_WELLS: &str = r#"{
  "ok": true,
  "message": "2 wells",
  "payload": {
    "wells": [
      {"uuid": "w-1", "wellData": {"Region": "TX", "WellName": "Welch 42"}, "api": "4200000001"},
      {"uuid": "w-2", "wellData": {"Region": "OK", "WellName": "Wells 7"}}
    ]
  }
}"#;
