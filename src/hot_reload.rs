use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use notify_debouncer_full::{
    new_debouncer, DebouncedEvent,
    notify::{RecursiveMode, Watcher, Error as NotifyError},
};
use tracing::{debug, error, info};

use crate::content_loader::reload_site;
use crate::state::{AppState, RefreshBroadcaster};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<RefreshBroadcaster>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, tx))
}

async fn handle_socket(mut socket: WebSocket, tx: RefreshBroadcaster) {
    let mut rx = tx.subscribe();

    if rx.recv().await.is_ok()
        && socket.send(Message::Text("reload".into())).await.is_err()
    {
        debug!("Client disconnected before reload message could be sent");
    }
}

/// Emacs lock files (`.#name`) and `name~` backups.
fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|s| s.starts_with(".#") || s.ends_with('~'))
}

fn is_relevant(event: &DebouncedEvent) -> bool {
    let kind_matters = event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
    kind_matters && !event.event.paths.iter().any(|p| is_temp_file(p))
}

pub fn start_content_watcher(tx: RefreshBroadcaster, app_state: Arc<AppState>) {
    let content_dir = app_state.config.content_dir.clone();
    info!(dir = %content_dir.display(), "Starting content watcher for hot-reload...");

    tokio::spawn(async move {
        let (watcher_tx, mut watcher_rx) = tokio::sync::mpsc::channel(1);

        let debouncer = new_debouncer(
            Duration::from_millis(200),
            None,
            move |res: Result<Vec<DebouncedEvent>, Vec<NotifyError>>| match res {
                Ok(events) => {
                    let relevant: Vec<_> = events.iter().filter(|e| is_relevant(e)).collect();
                    if relevant.is_empty() {
                        return;
                    }
                    debug!(
                        "Relevant file change detected: {:?}",
                        relevant
                            .iter()
                            .flat_map(|e| &e.event.paths)
                            .map(|p| p.display())
                            .collect::<Vec<_>>()
                    );
                    // A full channel already has a reload queued.
                    if let Err(e) = watcher_tx.try_send(()) {
                        debug!("Reload already pending: {}", e);
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("Watcher error: {}", e);
                    }
                }
            },
        );

        let mut debouncer = match debouncer {
            Ok(debouncer) => debouncer,
            Err(e) => {
                error!("Failed to create debouncer, hot reload disabled: {}", e);
                return;
            }
        };

        if let Err(e) = debouncer
            .watcher()
            .watch(&content_dir, RecursiveMode::Recursive)
        {
            error!(dir = %content_dir.display(), "Failed to watch content directory, hot reload disabled: {}", e);
            return;
        }

        // `debouncer` must stay alive for events to keep arriving.
        while watcher_rx.recv().await.is_some() {
            info!("Content change detected, reloading...");

            if reload_site(&app_state).await {
                if let Err(e) = tx.send(()) {
                    debug!("No browsers to notify: {}", e);
                }
            }
        }
    });
}
