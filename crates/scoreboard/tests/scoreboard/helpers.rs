use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use reqwest_middleware::reqwest::Url;
use scoreboard::{
    app, build_reqwest_client, AppState, BackendClient, GameApi, ViewRegistry, ViewSettings,
};
use tokio::{net::TcpListener, sync::Mutex};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One request as the stub backend saw it
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Game API stand-in that records every request and answers with canned responses
#[derive(Clone, Default)]
pub struct StubBackend {
    recorded: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<HashMap<String, (StatusCode, String)>>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn respond(&self, method: &str, path: &str, status: StatusCode, body: &str) {
        self.responses
            .lock()
            .await
            .insert(format!("{} {}", method, path), (status, body.to_string()));
    }

    pub async fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().await.clone()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.recorded()
            .await
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    /// Serves on an ephemeral port, returns the base url to point a client at
    pub async fn serve(&self) -> Url {
        let router = Router::new()
            .fallback(record_and_answer)
            .with_state(self.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}", address)).unwrap()
    }
}

async fn record_and_answer(
    State(stub): State<StubBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };
    stub.recorded.lock().await.push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    });

    let key = format!("{} {}", method, path);
    match stub.responses.lock().await.get(&key).cloned() {
        Some((status, body)) => (status, body).into_response(),
        None => (StatusCode::OK, "{}").into_response(),
    }
}

pub fn backend_client(base_url: &Url) -> BackendClient {
    let client = build_reqwest_client(Duration::from_secs(5)).unwrap();
    BackendClient::new(client, base_url)
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub views: Arc<ViewRegistry>,
}

impl TestApp {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .header("HX-Request", "true")
            .send()
            .await
            .unwrap()
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("HX-Request", "true")
            .send()
            .await
            .unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &HashMap<&str, &str>) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .unwrap()
    }
}

/// Runs the shell against `api` on an ephemeral port
pub async fn spawn_app(api: Arc<dyn GameApi>, view_settings: ViewSettings) -> TestApp {
    init_logger();
    let views = Arc::new(ViewRegistry::new());
    let state = AppState {
        ui_dir: String::from("../public_ui"),
        remote_url: String::from("http://127.0.0.1"),
        api,
        views: views.clone(),
        view_settings,
    };
    let router = app(state, vec![]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address: format!("http://{}", address),
        client: reqwest::Client::new(),
        views,
    }
}

/// View ids of the rendered page, in document order
pub fn view_ids(html: &str) -> Vec<String> {
    html.split("data-view-id=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(String::from)
        .collect()
}
