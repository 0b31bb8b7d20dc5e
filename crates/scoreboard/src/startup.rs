use crate::{
    api::routes::{
        details_dismiss_notice, details_fragment, details_start, details_stop,
        game_page_handler, games_close_form, games_dismiss_form_error, games_dismiss_notice,
        games_fragment, games_open_form, games_submit_form, health, home_page_handler,
        leaderboard_change_scope, leaderboard_close_form, leaderboard_dismiss_form_error,
        leaderboard_dismiss_notice, leaderboard_open_form, leaderboard_refresh,
        leaderboard_remove_player, leaderboard_submit_form, leaderboard_view_fragment,
        unmount_view,
    },
    config::{BackendSettings, Settings, ViewSettings},
    domain::{ViewRegistry, ViewSweeper},
    infra::{BackendClient, GameApi},
};

#[cfg(any(feature = "dev-backend", debug_assertions))]
use crate::infra::InMemoryBackend;
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::{connect_info::IntoMakeServiceWithConnectInfo, ConnectInfo, Path, Request, State},
    http::{header, Extensions, HeaderValue, StatusCode},
    middleware::{self, AddExtension, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    serve::Serve,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::{error, info, warn};
use reqwest_middleware::{
    reqwest::{self, Client, Url},
    ClientBuilder, ClientWithMiddleware, Middleware,
};
use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};
use tokio::signal::unix::{signal, SignalKind};
use tokio::{net::TcpListener, select};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub struct Application {
    server: Serve<
        TcpListener,
        IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
        AddExtension<Router, ConnectInfo<SocketAddr>>,
    >,
    local_addr: SocketAddr,
    cancellation_token: CancellationToken,
    background_tasks: TaskTracker,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            config.api_settings.domain, config.api_settings.port
        );
        let listener = SocketAddr::from_str(&address)?;
        let (app_state, background_tasks, cancellation_token) = build_app(config.clone()).await?;
        let (server, local_addr) =
            build_server(listener, app_state, config.api_settings.origins).await?;
        Ok(Self {
            server,
            local_addr,
            cancellation_token,
            background_tasks,
        })
    }

    /// Address actually bound, useful when configured with port 0
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        info!("Starting server...");
        match self.server.with_graceful_shutdown(shutdown_signal()).await {
            Ok(_) => {
                info!("Server shutdown initiated");
                self.cancellation_token.cancel();

                let timeout = tokio::time::sleep(Duration::from_secs(10));
                select! {
                    _ = self.background_tasks.wait() => {
                        info!("Background tasks completed gracefully");
                    }
                    _ = timeout => {
                        warn!("Background tasks timed out during shutdown");
                    }
                }

                info!("Shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!("Server shutdown error: {}", e);
                self.cancellation_token.cancel();

                let _ = tokio::time::timeout(Duration::from_secs(5), self.background_tasks.wait())
                    .await;

                Err(anyhow!("Error during server shutdown: {}", e))
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub ui_dir: String,
    pub remote_url: String,
    pub api: Arc<dyn GameApi>,
    pub views: Arc<ViewRegistry>,
    pub view_settings: ViewSettings,
}

pub async fn build_app(
    config: Settings,
) -> Result<(AppState, TaskTracker, CancellationToken), anyhow::Error> {
    info!(
        "Static UI assets configured at {}",
        config.ui_settings.ui_dir
    );

    let api = build_game_api(&config.backend_settings).await?;
    let views = Arc::new(ViewRegistry::new());

    let tracker = TaskTracker::new();
    let cancel_token = CancellationToken::new();
    let view_sweeper = ViewSweeper::new(
        views.clone(),
        cancel_token.clone(),
        Duration::from_secs(config.view_settings.view_ttl_secs),
        Duration::from_secs(config.view_settings.sweep_interval_secs),
    );
    tracker.spawn(async move {
        match view_sweeper.watch().await {
            Ok(_) => {
                info!("Successfully shutdown view sweeper")
            }
            Err(e) => {
                error!("Error in view sweeper: {}", e)
            }
        }
    });
    tracker.close();

    let app_state = AppState {
        ui_dir: config.ui_settings.ui_dir,
        remote_url: config.ui_settings.remote_url,
        api,
        views,
        view_settings: config.view_settings,
    };
    Ok((app_state, tracker, cancel_token))
}

#[cfg(any(feature = "dev-backend", debug_assertions))]
async fn build_game_api(settings: &BackendSettings) -> Result<Arc<dyn GameApi>, anyhow::Error> {
    if settings.mock_enabled {
        info!("In-memory game API configured");
        return Ok(Arc::new(InMemoryBackend::seeded().await));
    }
    remote_game_api(settings)
}

#[cfg(not(any(feature = "dev-backend", debug_assertions)))]
async fn build_game_api(settings: &BackendSettings) -> Result<Arc<dyn GameApi>, anyhow::Error> {
    if settings.mock_enabled {
        return Err(anyhow!(
            "In-memory game API requires dev-backend feature or debug build"
        ));
    }
    remote_game_api(settings)
}

fn remote_game_api(settings: &BackendSettings) -> Result<Arc<dyn GameApi>, anyhow::Error> {
    let base_url = Url::parse(&settings.base_url)
        .map_err(|e| anyhow!("Failed to parse game api url: {}", e))?;
    let client = build_reqwest_client(Duration::from_secs(settings.request_timeout_secs))?;
    info!("Game API client configured for {}", base_url);
    Ok(Arc::new(BackendClient::new(client, &base_url)))
}

pub async fn build_server(
    socket_addr: SocketAddr,
    app_state: AppState,
    origins: Vec<String>,
) -> Result<
    (
        Serve<
            TcpListener,
            IntoMakeServiceWithConnectInfo<Router, SocketAddr>,
            AddExtension<Router, ConnectInfo<SocketAddr>>,
        >,
        SocketAddr,
    ),
    anyhow::Error,
> {
    let listener = TcpListener::bind(socket_addr).await?;
    let local_addr = listener.local_addr()?;

    info!("Setting up service");
    let app = app(app_state, origins);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    info!(
        "Service running @: http://{}:{}",
        local_addr.ip(),
        local_addr.port()
    );
    Ok((server, local_addr))
}

pub fn app(app_state: AppState, origins: Vec<String>) -> Router {
    let origins: Vec<HeaderValue> = origins
        .into_iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true);

    let games_view = Router::new()
        .route("/", get(games_fragment))
        .route("/form/open", post(games_open_form))
        .route("/form/close", post(games_close_form))
        .route("/form", post(games_submit_form))
        .route("/form/error/dismiss", post(games_dismiss_form_error))
        .route("/notice/dismiss", post(games_dismiss_notice));

    let leaderboard_view = Router::new()
        .route("/", get(leaderboard_view_fragment))
        .route("/refresh", post(leaderboard_refresh))
        .route("/scope", post(leaderboard_change_scope))
        .route("/form/open", post(leaderboard_open_form))
        .route("/form/close", post(leaderboard_close_form))
        .route("/form", post(leaderboard_submit_form))
        .route("/form/error/dismiss", post(leaderboard_dismiss_form_error))
        .route(
            "/players/{player_id}/remove",
            post(leaderboard_remove_player),
        )
        .route("/notice/dismiss", post(leaderboard_dismiss_notice));

    let details_view = Router::new()
        .route("/", get(details_fragment))
        .route("/start", post(details_start))
        .route("/stop", post(details_stop))
        .route("/notice/dismiss", post(details_dismiss_notice));

    Router::new()
        .route("/", get(home_page_handler))
        .route("/game/{game_id}", get(game_page_handler))
        .route("/api/v1/health_check", get(health))
        .route("/views/{view_id}/unmount", post(unmount_view))
        .nest("/views/games/{view_id}", games_view)
        .nest("/views/leaderboards/{view_id}", leaderboard_view)
        .nest("/views/details/{view_id}", details_view)
        .route("/ui/{*path}", get(serve_static_file))
        .layer(middleware::from_fn(log_request))
        .with_state(Arc::new(app_state))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}

async fn serve_static_file(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    if path.contains("..") {
        return (StatusCode::BAD_REQUEST, "Bad request").into_response();
    }

    let file_path = std::path::Path::new(&state.ui_dir).join(&path);

    let content = match tokio::fs::read(&file_path).await {
        Ok(c) => c,
        Err(_) => return (StatusCode::NOT_FOUND, "Not found").into_response(),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, get_mime_type(&path))
        .body(Body::from(content))
        .unwrap_or_else(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response())
}

fn get_mime_type(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext {
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "json" | "map" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// One attempt per call: the game API client never retries
pub fn build_reqwest_client(timeout: Duration) -> Result<ClientWithMiddleware, anyhow::Error> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow!("Failed to build http client: {}", e))?;
    Ok(ClientBuilder::new(client).with(LoggingMiddleware).build())
}

struct LoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let method = req.method().clone();
        let url = req.url().clone();

        info!("Making {} request to: {}", method, url);

        let result = next.run(req, extensions).await;

        match &result {
            Ok(response) => {
                info!("{} {} -> Status: {}", method, url, response.status());
            }
            Err(error) => {
                warn!("{} {} -> Error: {:?}", method, url, error);
            }
        }

        result
    }
}

async fn shutdown_signal() {
    let (Ok(mut sigint), Ok(mut sigterm)) = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) else {
        error!("Failed to install signal handlers, stopping only on ctrl-c");
        let _ = tokio::signal::ctrl_c().await;
        return;
    };

    select! {
        _ = sigint.recv() => info!("Received SIGINT signal"),
        _ = sigterm.recv() => info!("Received SIGTERM signal"),
    }
}
