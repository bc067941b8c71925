//! Minimal loopback HTTP server for crawl tests
//!
//! Serves a fixed set of paths over HTTP/1.1 with `Connection: close`.
//! Unknown paths get a 404. Runs until the test process exits.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone)]
struct Resource {
    content_type: &'static str,
    body: Vec<u8>,
}

pub struct TestServer {
    base: String,
    hits: Arc<Mutex<Vec<String>>>,
}

#[derive(Default)]
pub struct SiteBuilder {
    resources: HashMap<String, Resource>,
}

impl SiteBuilder {
    pub fn page(mut self, path: &str, html: &str) -> Self {
        self.resources.insert(
            path.to_string(),
            Resource {
                content_type: "text/html; charset=utf-8",
                body: html.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn file(mut self, path: &str, body: &[u8]) -> Self {
        self.resources.insert(
            path.to_string(),
            Resource {
                content_type: "application/octet-stream",
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn serve(self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let resources = Arc::new(self.resources);
        let hits = Arc::new(Mutex::new(Vec::new()));

        let server_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let resources = Arc::clone(&resources);
                let hits = Arc::clone(&server_hits);
                thread::spawn(move || handle(stream, &resources, &hits));
            }
        });

        TestServer { base, hits }
    }
}

impl TestServer {
    /// Absolute URL for `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Paths requested so far, in arrival order
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

fn handle(stream: TcpStream, resources: &HashMap<String, Resource>, hits: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(match stream.try_clone() {
        Ok(s) => s,
        Err(_) => return,
    });

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    // Drain headers
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => {}
        }
    }

    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    hits.lock().unwrap().push(path.clone());

    let (status, resource) = match resources.get(&path) {
        Some(r) => ("200 OK", r.clone()),
        None => (
            "404 Not Found",
            Resource {
                content_type: "text/plain",
                body: b"not found".to_vec(),
            },
        ),
    };

    let mut stream = stream;
    let header = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        resource.content_type,
        resource.body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&resource.body);
    let _ = stream.flush();
}

/// A small site: home links to two pages (one missing) and embeds media
pub fn sample_site() -> TestServer {
    SiteBuilder::default()
        .page(
            "/",
            r#"<html><head><title>Home</title><script>ignored()</script></head>
               <body><h1>Welcome</h1><p>Start   here.</p>
               <a href="/about">About</a>
               <a href="/missing">Missing</a>
               <img src="/static/logo.png">
               <video src="/media/intro.mp4"></video>
               </body></html>"#,
        )
        .page(
            "/about",
            r#"<html><body><p>About us</p><a href="/">Home</a><a href="/team">Team</a></body></html>"#,
        )
        .page("/team", "<html><body><p>The team</p></body></html>")
        .file("/static/logo.png", b"\x89PNG fake image")
        .file("/media/intro.mp4", b"fake video bytes")
        .serve()
}
