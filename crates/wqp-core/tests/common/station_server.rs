//! Minimal HTTP/1.1 server that imitates the station-summary search for integration tests.
//!
//! Serves a GeoJSON feature collection built from a fixed per-county dataset.
//! `statecode` queries return every county's sites (or 500 when broad queries
//! are set to fail); `countycode` queries return the listed counties' sites.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

/// One site served by the test server.
#[derive(Debug, Clone)]
pub struct Site {
    pub org_id: String,
    pub site_id: String,
    pub site_type: String,
    pub result_count: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StationServerOptions {
    /// If true, any `statecode` query returns 500 (simulates an overly broad query).
    pub fail_broad: bool,
}

/// Handle to a running server: base URL plus the scopes it was asked for.
pub struct StationServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StationServer {
    /// Scope of each request seen so far, e.g. `statecode=US:55` or
    /// `countycode=US:55:001;US:55:003`.
    pub fn scopes(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(
    counties: BTreeMap<String, Vec<Site>>,
    opts: StationServerOptions,
) -> StationServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let counties = Arc::new(counties);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let counties = Arc::clone(&counties);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &counties, &seen, opts));
        }
    });
    StationServer {
        url: format!("http://127.0.0.1:{}/data/Station/search", port),
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    counties: &BTreeMap<String, Vec<Site>>,
    seen: &Mutex<Vec<String>>,
    opts: StationServerOptions,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 16384];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let url = match url::Url::parse(&format!("http://localhost{}", target)) {
        Ok(u) => u,
        Err(_) => {
            let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
            return;
        }
    };
    let params: BTreeMap<String, String> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let sites: Vec<(&str, &Site)> = if let Some(state) = params.get("statecode") {
        seen.lock().unwrap().push(format!("statecode={}", state));
        if opts.fail_broad {
            let body = b"<html>query too large</html>";
            let head = format!(
                "HTTP/1.1 500 Internal Server Error\r\nContent-Length: {}\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
            return;
        }
        counties
            .iter()
            .flat_map(|(c, s)| s.iter().map(move |site| (c.as_str(), site)))
            .collect()
    } else if let Some(list) = params.get("countycode") {
        seen.lock().unwrap().push(format!("countycode={}", list));
        list.split(';')
            .filter_map(|c| counties.get_key_value(c))
            .flat_map(|(c, s)| s.iter().map(move |site| (c.as_str(), site)))
            .collect()
    } else {
        Vec::new()
    };

    let features: Vec<serde_json::Value> = sites
        .into_iter()
        .map(|(county, s)| {
            serde_json::json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-89.4, 43.1]},
                "properties": {
                    "OrganizationIdentifier": s.org_id,
                    "MonitoringLocationIdentifier": s.site_id,
                    "ResolvedMonitoringLocationTypeName": s.site_type,
                    "StateName": "Wisconsin",
                    "CountyName": county,
                    "HUCEightDigitCode": "07090001",
                    "resultCount": s.result_count.to_string()
                }
            })
        })
        .collect();
    let body = serde_json::json!({"type": "FeatureCollection", "features": features}).to_string();
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body.as_bytes());
}
