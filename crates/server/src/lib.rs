use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use nowplay_bridge_core::{
    epoch_ms, parse_command, select_raw_command, CommandRequest, RemoteCommand, TrackStatusPayload,
};
use nowplay_bridge_engine::{run_cache_loop, LaneReceiver, LaneSender, TrackCache};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone)]
struct AppState {
    cache: Arc<TrackCache>,
    command_tx: LaneSender<RemoteCommand>,
}

async fn handle_command(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    match select_raw_command(&pairs).and_then(parse_command) {
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": "Missing or invalid command"})),
        )
            .into_response(),
        Some(CommandRequest::Info) => match state.cache.read(epoch_ms()).await {
            Some(payload) => Json(payload).into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({"status": "UNKNOWN", "message": "No track data"})),
            )
                .into_response(),
        },
        Some(CommandRequest::Control(command)) => {
            // 200 means forwarded, not executed: the renderer side may still
            // fail to match a control, and the lane never reports back.
            if state.command_tx.send(command) {
                Json(json!({"status": "ok", "command": command})).into_response()
            } else {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"status": "error", "message": "Renderer window unavailable"})),
                )
                    .into_response()
            }
        }
    }
}

struct Running {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    serve_task: JoinHandle<()>,
    cache_task: JoinHandle<()>,
}

pub struct CommandServer {
    host: String,
    port: u16,
    command_tx: LaneSender<RemoteCommand>,
    track_rx: Arc<Mutex<LaneReceiver<TrackStatusPayload>>>,
    cache: Arc<TrackCache>,
    running: Option<Running>,
}

impl CommandServer {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        command_tx: LaneSender<RemoteCommand>,
        track_rx: LaneReceiver<TrackStatusPayload>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            command_tx,
            track_rx: Arc::new(Mutex::new(track_rx)),
            cache: Arc::new(TrackCache::new()),
            running: None,
        }
    }

    pub async fn start(&mut self) -> Result<(), ServerError> {
        if self.running.is_some() {
            debug!("command server already listening, start ignored");
            return Ok(());
        }

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let state = AppState {
            cache: self.cache.clone(),
            command_tx: self.command_tx.clone(),
        };
        let app = Router::new()
            .route("/command", get(handle_command))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let serve_task = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                warn!(error = %err, "command server terminated");
            }
        });
        let cache_task = tokio::spawn(run_cache_loop(self.track_rx.clone(), self.cache.clone()));

        info!(addr = %local_addr, "command server listening");
        self.running = Some(Running {
            addr: local_addr,
            shutdown_tx,
            serve_task,
            cache_task,
        });
        Ok(())
    }

    // Drains in-flight requests, releases the port, parks the lane receiver.
    pub async fn stop(&mut self) {
        let running = match self.running.take() {
            Some(running) => running,
            None => {
                debug!("command server not listening, stop ignored");
                return;
            }
        };

        let _ = running.shutdown_tx.send(());
        if let Err(err) = running.serve_task.await {
            if !err.is_cancelled() {
                warn!(error = %err, "command server task join failed");
            }
        }
        running.cache_task.abort();
        let _ = running.cache_task.await;
        info!("command server stopped");
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.addr)
    }
}
