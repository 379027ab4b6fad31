use processos_core::{
    CoreConfig, FetchError, FileRecordSource, HttpRecordSource, RecordSource, ENV_FALLBACK_LOCATION,
    ENV_FETCH_TIMEOUT_MS,
};
use reqwest::blocking::Client;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const SEED: &str = r#"[{"numero":"001","reclamante":"Maria Souza","reclamada":"Empresa X Ltda",
"status":"Ativo","valorCausa":1500.5,"dataAjuizamento":"2023-05-10","cidade":"Campinas",
"uf":"SP","vara":"1ª Vara do Trabalho"}]"#;

fn loopback_source(url: String) -> HttpRecordSource {
    let client = Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    HttpRecordSource::with_client(url, client)
}

/// Serves exactly one HTTP response on a loopback port.
fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/processos.json", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        loop {
            line.clear();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
    });

    (url, handle)
}

/// Accepts one connection and never answers it.
fn serve_silence(hold_for: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/processos.json", listener.local_addr().unwrap());

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(hold_for);
        drop(stream);
    });

    url
}

#[test]
fn http_source_decodes_seed_array() {
    let (url, server) = serve_once("200 OK", SEED);
    let source = loopback_source(url);

    let records = source.fetch().unwrap();
    server.join().unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identifier, "001");
    assert_eq!(records[0].case_value, 1500.5);
}

#[test]
fn http_500_maps_to_status_error() {
    let (url, server) = serve_once("500 Internal Server Error", "");
    let source = loopback_source(url);

    let err = source.fetch().unwrap_err();
    server.join().unwrap();

    assert_eq!(err, FetchError::HttpStatus(500));
    assert_eq!(err.to_string(), "Erro HTTP: 500");
}

#[test]
fn http_body_that_is_not_an_array_is_a_decode_error() {
    let (url, server) = serve_once("200 OK", r#"{"processos":[]}"#);
    let source = loopback_source(url);

    let err = source.fetch().unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[test]
fn unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/processos.json", listener.local_addr().unwrap());
    drop(listener);

    let source = loopback_source(url);
    assert!(matches!(source.fetch(), Err(FetchError::Network(_))));
}

#[test]
fn file_source_reads_seed_and_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processos.json");
    std::fs::write(&path, SEED).unwrap();

    let records = FileRecordSource::new(&path).fetch().unwrap();
    assert_eq!(records[0].court_name, "1ª Vara do Trabalho");

    let missing = FileRecordSource::new(dir.path().join("ausente.json"));
    assert!(matches!(missing.fetch(), Err(FetchError::Io(_))));
}

#[test]
fn silent_server_times_out_as_network_error() {
    let url = serve_silence(Duration::from_secs(10));
    let client = Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(250))
        .build()
        .unwrap();
    let source = HttpRecordSource::with_client(url, client);

    let started_at = Instant::now();
    let err = source.fetch().unwrap_err();
    let elapsed = started_at.elapsed();

    assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
    assert!(elapsed >= Duration::from_millis(200), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "returned after {elapsed:?}");
}

#[test]
fn configured_fetch_timeout_bounds_the_fallback_fetch() {
    let url = serve_silence(Duration::from_secs(10));
    let config = CoreConfig::from_lookup(|name| match name {
        ENV_FALLBACK_LOCATION => Some(url.clone()),
        ENV_FETCH_TIMEOUT_MS => Some("250".to_string()),
        _ => None,
    });
    assert_eq!(config.fetch_timeout, Some(Duration::from_millis(250)));
    let source = config.fallback_source().unwrap();

    let started_at = Instant::now();
    let err = source.fetch().unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
    assert!(started_at.elapsed() < Duration::from_secs(5));
}
