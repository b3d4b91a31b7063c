mod feed;
mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use clap::Args;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

use crate::constants::{BIND_ADDR, DATA_PATH};
use crate::logging;
use crate::store::{self, NewsStore};

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to bind the HTTP listener on
    #[arg(short, long, default_value = BIND_ADDR)]
    pub addr: SocketAddr,

    /// JSONL file backing the news store
    #[arg(short, long, default_value = DATA_PATH)]
    pub data_path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownSignal {
    None,
    Graceful,
    Immediate,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub store: Arc<NewsStore>,
    pub shutdown: watch::Receiver<ShutdownSignal>,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let store = store::shared(&args.data_path).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(ShutdownSignal::None);
    let signals_task = tokio::spawn(handle_signals(shutdown_tx));

    let result = run_with_store(args.addr, store, shutdown_rx).await;

    signals_task.abort();
    let _ = signals_task.await;
    result
}

/// Serve the news API and live feed until the shutdown signal flips.
pub async fn run_with_store(
    addr: SocketAddr,
    store: Arc<NewsStore>,
    shutdown: watch::Receiver<ShutdownSignal>,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind news server at {addr}"))?;

    logging::info(
        "server.bind",
        "News server listening",
        json!({ "addr": addr.to_string() }),
    );

    let app = router(AppState {
        store,
        shutdown: shutdown.clone(),
    });

    let mut shutdown_rx = shutdown;
    let shutdown_signal = async move {
        while shutdown_rx.changed().await.is_ok() {
            if !matches!(*shutdown_rx.borrow(), ShutdownSignal::None) {
                break;
            }
        }
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("news server terminated with error")?;

    logging::info_simple("server.stop", "News server stopped");
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/news",
            get(routes::list_news).post(routes::create_news),
        )
        .route("/api/news/stream", get(feed::stream_inserts))
        .route(
            "/api/news/:id",
            get(routes::fetch_news).delete(routes::delete_news),
        )
        .with_state(state)
}

async fn handle_signals(shutdown_tx: watch::Sender<ShutdownSignal>) -> Result<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("failed to register SIGINT handler")?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                logging::info(
                    "signal.received",
                    "SIGTERM received, initiating graceful shutdown",
                    json!({ "signal": "SIGTERM" })
                );
                if shutdown_tx.send(ShutdownSignal::Graceful).is_err() {
                    break;
                }
            }
            _ = sigint.recv() => {
                logging::warn(
                    "signal.received",
                    "SIGINT received, forcing immediate shutdown",
                    json!({ "signal": "SIGINT" })
                );
                let _ = shutdown_tx.send(ShutdownSignal::Immediate);
                break;
            }
        }
    }

    Ok(())
}
