//! In-memory stand-in for the Minds service, served through wiremock.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use minds_client::MindsClient;
use serde_json::{json, Value};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const PROJECT: &str = "mindsdb";

/// Mutable state of the fake service.
#[derive(Default)]
pub struct State {
    pub datasources: BTreeMap<String, Value>,
    pub minds: BTreeMap<String, Value>,
    /// Answer every completion returns.
    pub answer: String,
    /// `METHOD path` of every request received, in order.
    pub requests: Vec<String>,
}

/// A stateful responder that behaves like the service's REST surface.
#[derive(Clone, Default)]
pub struct FakeService {
    state: Arc<Mutex<State>>,
}

impl FakeService {
    pub fn new(answer: &str) -> Self {
        let service = Self::default();
        service.state().answer = answer.to_string();
        service
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Seed a datasource without going through the API.
    pub fn seed_datasource(&self, value: Value) {
        let name = value["name"].as_str().unwrap().to_string();
        self.state().datasources.insert(name, value);
    }

    /// Requests received so far matching a `METHOD path` prefix.
    pub fn count(&self, prefix: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

fn error(status: u16, detail: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "detail": detail }))
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

impl Respond for FakeService {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state();
        let method = request.method.as_str().to_string();
        state
            .requests
            .push(format!("{} {}", method, request.url.path()));

        let expected = format!("Bearer {}", API_KEY);
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some(expected.as_str());
        if !authorized {
            return error(401, "Invalid API key");
        }

        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let segments: Vec<&str> = request
            .url
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();

        match (method.as_str(), segments.as_slice()) {
            // ── Datasources ───────────────────────────────────────────────
            ("GET", ["api", "datasources"]) => {
                ok(Value::Array(state.datasources.values().cloned().collect()))
            }
            ("POST", ["api", "datasources"]) => {
                let name = body["name"].as_str().unwrap_or_default().to_string();
                if state.datasources.contains_key(&name) {
                    return error(409, &format!("Database {} already exists", name));
                }
                state.datasources.insert(name, body);
                ok(json!({}))
            }
            ("GET", ["api", "datasources", name]) => match state.datasources.get(*name) {
                Some(ds) => ok(ds.clone()),
                None => error(404, &format!("Datasource {} not found", name)),
            },
            ("DELETE", ["api", "datasources", name]) => {
                match state.datasources.remove(*name) {
                    Some(_) => ok(json!({})),
                    None => error(404, &format!("Datasource {} not found", name)),
                }
            }

            // ── Minds ─────────────────────────────────────────────────────
            ("GET", ["api", "projects", PROJECT, "minds"]) => {
                ok(Value::Array(state.minds.values().cloned().collect()))
            }
            ("POST", ["api", "projects", PROJECT, "minds"]) => {
                let name = body["name"].as_str().unwrap_or_default().to_string();
                if state.minds.contains_key(&name) {
                    return error(400, &format!("Mind with name {} already exists", name));
                }
                let datasources = body["datasources"].as_array().cloned().unwrap_or_default();
                for ds in &datasources {
                    let ds = ds.as_str().unwrap_or_default();
                    if !state.datasources.contains_key(ds) {
                        return error(400, &format!("Datasource {} does not exist", ds));
                    }
                }
                let mind = json!({
                    "name": name,
                    "model_name": body.get("model_name").cloned().unwrap_or(json!("gpt-4o")),
                    "provider": body.get("provider").cloned().unwrap_or(json!("openai")),
                    "parameters": body.get("parameters").cloned().unwrap_or(json!({})),
                    "datasources": datasources,
                    "created_at": "2024-10-01T10:00:00",
                    "updated_at": "2024-10-01T10:00:00",
                });
                state.minds.insert(name, mind);
                ok(json!({}))
            }
            ("GET", ["api", "projects", PROJECT, "minds", name]) => match state.minds.get(*name) {
                Some(mind) => ok(mind.clone()),
                None => error(404, &format!("Mind {} not found", name)),
            },
            ("DELETE", ["api", "projects", PROJECT, "minds", name]) => {
                match state.minds.remove(*name) {
                    Some(_) => ok(json!({})),
                    None => error(404, &format!("Mind {} not found", name)),
                }
            }
            ("PATCH", ["api", "projects", PROJECT, "minds", name]) => {
                let Some(mut mind) = state.minds.remove(*name) else {
                    return error(404, &format!("Mind {} not found", name));
                };
                for field in ["name", "model_name", "provider", "parameters", "datasources"] {
                    if let Some(value) = body.get(field) {
                        mind[field] = value.clone();
                    }
                }
                mind["updated_at"] = json!("2024-10-02T10:00:00");
                let new_name = mind["name"].as_str().unwrap_or_default().to_string();
                state.minds.insert(new_name, mind);
                ok(json!({}))
            }
            ("POST", ["api", "projects", PROJECT, "minds", name, "datasources"]) => {
                let ds = body["name"].as_str().unwrap_or_default().to_string();
                if !state.datasources.contains_key(&ds) {
                    return error(404, &format!("Datasource {} not found", ds));
                }
                let Some(mind) = state.minds.get_mut(*name) else {
                    return error(404, &format!("Mind {} not found", name));
                };
                let members = mind["datasources"].as_array_mut().unwrap();
                if members.iter().any(|m| m == &json!(ds)) {
                    return error(409, &format!("Datasource {} already attached", ds));
                }
                members.push(json!(ds));
                ok(json!({}))
            }
            ("DELETE", ["api", "projects", PROJECT, "minds", name, "datasources", ds]) => {
                let Some(mind) = state.minds.get_mut(*name) else {
                    return error(404, &format!("Mind {} not found", name));
                };
                let members = mind["datasources"].as_array_mut().unwrap();
                let before = members.len();
                members.retain(|m| m != &json!(ds));
                if members.len() == before {
                    return error(404, &format!("Datasource {} not attached", ds));
                }
                ok(json!({}))
            }

            // ── Completions ───────────────────────────────────────────────
            ("POST", ["api", "chat", "completions"]) => {
                let model = body["model"].as_str().unwrap_or_default();
                if !state.minds.contains_key(model) {
                    return error(404, &format!("Mind {} not found", model));
                }
                if body["stream"].as_bool().unwrap_or(false) {
                    ResponseTemplate::new(200)
                        .set_body_raw(sse_body(model, &state.answer), "text/event-stream")
                } else {
                    ok(json!({
                        "id": "chatcmpl-1",
                        "object": "chat.completion",
                        "model": model,
                        "choices": [{
                            "index": 0,
                            "message": {"role": "assistant", "content": state.answer},
                            "finish_reason": "stop"
                        }]
                    }))
                }
            }

            _ => error(404, "Not Found"),
        }
    }
}

/// Split an answer into server-sent chunk frames.
pub fn sse_body(model: &str, answer: &str) -> String {
    let mut body = String::new();
    let chars: Vec<char> = answer.chars().collect();

    let role = json!({
        "id": "chatcmpl-1",
        "model": model,
        "choices": [{"index": 0, "delta": {"role": "assistant"}, "finish_reason": null}]
    });
    body.push_str(&format!("data: {}\n\n", role));

    for piece in chars.chunks(4) {
        let content: String = piece.iter().collect();
        let frame = json!({
            "id": "chatcmpl-1",
            "model": model,
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        });
        body.push_str(&format!("data: {}\n\n", frame));
    }

    let last = json!({
        "id": "chatcmpl-1",
        "model": model,
        "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]
    });
    body.push_str(&format!("data: {}\n\n", last));
    body.push_str("data: [DONE]\n\n");
    body
}

/// A running fake service with a client pointed at it.
pub struct TestEnv {
    pub server: MockServer,
    pub service: FakeService,
    pub client: MindsClient,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self::with_answer("¡Hola! ¿En qué puedo ayudarte hoy?").await
    }

    pub async fn with_answer(answer: &str) -> Self {
        let server = MockServer::start().await;
        let service = FakeService::new(answer);
        Mock::given(any())
            .respond_with(service.clone())
            .mount(&server)
            .await;

        let client = MindsClient::builder()
            .base_url(server.uri())
            .api_key(API_KEY)
            .build()
            .unwrap();

        Self {
            server,
            service,
            client,
        }
    }

    /// A client for the same service with a different key.
    pub fn client_with_key(&self, key: &str) -> MindsClient {
        MindsClient::builder()
            .base_url(self.server.uri())
            .api_key(key)
            .build()
            .unwrap()
    }
}
