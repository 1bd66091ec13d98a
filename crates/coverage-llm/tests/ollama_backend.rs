//! Integration tests for OllamaProvider against a fake Ollama backend

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use coverage_domain::{ModelCatalog, ModelClient};
use coverage_llm::{ensure_model, LlmError, OllamaConfig, OllamaProvider};
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct Backend {
    generate_bodies: Arc<Mutex<Vec<Value>>>,
    pulls: Arc<Mutex<Vec<String>>>,
}

/// Serve `app` on an ephemeral port from a background runtime
fn spawn_backend(app: Router) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    format!("http://{}", addr)
}

async fn generate(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    backend.generate_bodies.lock().unwrap().push(body);
    Json(json!({
        "model": "llama3.2:3b",
        "response": "{\"Subscriber ID\": \"12345\"}",
        "done": true
    }))
}

async fn tags() -> Json<Value> {
    Json(json!({ "models": [{ "name": "mistral:latest" }] }))
}

async fn pull_ok(State(backend): State<Backend>, Json(body): Json<Value>) -> impl IntoResponse {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    backend.pulls.lock().unwrap().push(name);
    concat!(
        "{\"status\":\"pulling manifest\"}\n",
        "{\"status\":\"downloading\",\"total\":10,\"completed\":10}\n",
        "{\"status\":\"success\"}\n",
    )
}

async fn pull_truncated() -> impl IntoResponse {
    "{\"status\":\"pulling manifest\"}\n"
}

async fn overloaded() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "server busy")
}

fn healthy_backend(backend: Backend) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/tags", get(tags))
        .route("/api/pull", post(pull_ok))
        .with_state(backend)
}

#[test]
fn test_complete_returns_response_text() {
    let backend = Backend::default();
    let url = spawn_backend(healthy_backend(backend.clone()));
    let provider = OllamaProvider::new(url, "llama3.2:3b").unwrap();

    let text = provider.complete("extract please").unwrap();
    assert_eq!(text, "{\"Subscriber ID\": \"12345\"}");
}

#[test]
fn test_complete_sends_fixed_decoding_options() {
    let backend = Backend::default();
    let url = spawn_backend(healthy_backend(backend.clone()));
    let provider = OllamaProvider::new(url, "llama3.2:3b").unwrap();

    provider.complete("extract please").unwrap();

    let bodies = backend.generate_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["model"], "llama3.2:3b");
    assert_eq!(body["prompt"], "extract please");
    assert_eq!(body["stream"], false);
    assert_eq!(body["options"]["num_predict"], 1000);
    assert!((body["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
}

#[test]
fn test_complete_non_success_is_backend_error() {
    let url = spawn_backend(Router::new().route("/api/generate", post(overloaded)));
    let provider = OllamaProvider::new(url, "llama3.2:3b").unwrap();

    match provider.complete("extract please") {
        Err(LlmError::Backend { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "server busy");
        }
        other => panic!("Expected Backend error, got {:?}", other),
    }
}

#[test]
fn test_list_models() {
    let url = spawn_backend(healthy_backend(Backend::default()));
    let provider = OllamaProvider::new(url, "llama3.2:3b").unwrap();

    assert_eq!(provider.list_models().unwrap(), vec!["mistral:latest"]);
}

#[test]
fn test_ensure_model_pulls_missing_model() {
    let backend = Backend::default();
    let url = spawn_backend(healthy_backend(backend.clone()));
    let provider = OllamaProvider::new(url, "llama3.2:3b").unwrap();

    ensure_model(&provider, "llama3.2:3b").unwrap();
    assert_eq!(*backend.pulls.lock().unwrap(), vec!["llama3.2:3b".to_string()]);
}

#[test]
fn test_ensure_model_skips_present_model() {
    let backend = Backend::default();
    let url = spawn_backend(healthy_backend(backend.clone()));
    let config = OllamaConfig {
        endpoint: url,
        model: "mistral".to_string(),
        ..OllamaConfig::default()
    };
    let provider = OllamaProvider::from_config(&config).unwrap();

    ensure_model(&provider, "mistral").unwrap();
    assert!(backend.pulls.lock().unwrap().is_empty());
}

#[test]
fn test_ensure_model_truncated_pull_stream() {
    let app = Router::new()
        .route("/api/tags", get(tags))
        .route("/api/pull", post(pull_truncated));
    let url = spawn_backend(app);
    let provider = OllamaProvider::new(url, "llama3.2:3b").unwrap();

    let result = ensure_model(&provider, "llama3.2:3b");
    assert!(matches!(result, Err(LlmError::Provisioning(_))));
}

#[test]
fn test_ensure_model_unreachable_backend() {
    let provider = OllamaProvider::new("http://127.0.0.1:1", "llama3.2:3b").unwrap();

    let result = ensure_model(&provider, "llama3.2:3b");
    assert!(matches!(result, Err(LlmError::Connection(_))));
}

/// Answer one pull request with progress lines trickling in `gap` apart
fn spawn_slow_pull_backend(events: usize, gap: Duration) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_request(&mut stream);

        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nConnection: close\r\n\r\n")
            .unwrap();
        for i in 0..events {
            let line = format!(
                "{{\"status\":\"downloading\",\"total\":{},\"completed\":{}}}\n",
                events,
                i + 1
            );
            stream.write_all(line.as_bytes()).unwrap();
            stream.flush().unwrap();
            std::thread::sleep(gap);
        }
        stream.write_all(b"{\"status\":\"success\"}\n").unwrap();
    });

    format!("http://{}", addr)
}

/// Consume request headers and a Content-Length body
fn read_request(stream: &mut std::net::TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).unwrap();
        request.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&request);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= end + 4 + length {
                return;
            }
        }
        if n == 0 {
            return;
        }
    }
}

#[test]
fn test_pull_outlasting_connect_timeout_succeeds() {
    let url = spawn_slow_pull_backend(6, Duration::from_millis(400));
    let config = OllamaConfig {
        endpoint: url,
        pull_timeout_secs: 1,
        ..OllamaConfig::default()
    };
    let provider = OllamaProvider::from_config(&config).unwrap();

    let start = Instant::now();
    provider.pull_model("llama3.2:3b").unwrap();
    assert!(start.elapsed() > config.pull_timeout());
}
