use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, get_service},
    Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    config::Config,
    content_loader::load_site,
    hot_reload::{start_content_watcher, ws_handler},
    pages,
    state::{AppState, RouterState},
};

async fn homepage(State(state): State<Arc<AppState>>) -> Html<String> {
    let content = state.content.read().await;
    Html(pages::home(&state.shell(&content), &content.site))
}

async fn resume_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let content = state.content.read().await;
    Html(pages::resume(&state.shell(&content), &content.site))
}

#[derive(Deserialize, Debug, Default)]
struct BlogQuery {
    q: Option<String>,
}

async fn blog_index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlogQuery>,
) -> Html<String> {
    let content = state.content.read().await;
    Html(pages::blog_index(
        &state.shell(&content),
        &content.site,
        query.q.as_deref(),
    ))
}

async fn blog_post(
    slug: Result<Path<String>, PathRejection>,
    uri: Uri,
    State(state): State<Arc<AppState>>,
) -> Response {
    // A segment that does not even decode to UTF-8 is just another bad slug.
    let slug = match slug {
        Ok(Path(slug)) => slug,
        Err(rejection) => {
            info!(path = uri.path(), "rejected post path: {}", rejection.body_text());
            return not_found(uri, State(state)).await.into_response();
        }
    };

    // Read before taking the lock; post bodies are never cached.
    let loaded = state.store.load_content(&slug).await;

    match loaded {
        Ok(markdown) => {
            let content = state.content.read().await;
            let page = pages::blog_post(&state.shell(&content), &content.site, &slug, &markdown);
            Html(page).into_response()
        }
        Err(e) if e.is_not_found() => {
            info!(%slug, "post not found: {}", e);
            not_found(uri, State(state)).await.into_response()
        }
        Err(e) => {
            error!(%slug, "failed to load post: {:#}", anyhow::Error::from(e));
            let content = state.content.read().await;
            (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error(&state.shell(&content))))
                .into_response()
        }
    }
}

async fn not_found(uri: Uri, State(state): State<Arc<AppState>>) -> (StatusCode, Html<String>) {
    let content = state.content.read().await;
    (
        StatusCode::NOT_FOUND,
        Html(pages::not_found(&state.shell(&content), &content.not_found, uri.path())),
    )
}

pub fn router(state: RouterState) -> Router {
    let static_dir = get_service(ServeDir::new(state.app_state.config.static_dir()));

    let mut router = Router::new()
        .route("/", get(homepage))
        .route("/resume", get(resume_page))
        .route("/blogs", get(blog_index))
        .route("/blogs/{slug}", get(blog_post))
        .nest_service("/static", static_dir);

    if state.app_state.config.is_development {
        router = router.route("/ws", get(ws_handler));
    }

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    info!("RUST_ENV is set to development: {}", config.is_development);

    let content = load_site(&config)
        .await
        .with_context(|| format!("failed to load site from `{}`", config.content_dir.display()))?;
    info!(routes = content.slugs.len(), "Blog routes enumerated");

    let is_development = config.is_development;
    let state = Arc::new(AppState::new(config, content));

    let (tx, _rx) = broadcast::channel(1);
    if is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let app = router(RouterState {
        app_state: state,
        broadcaster: tx,
    });

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
