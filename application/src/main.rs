use std::{io, sync::OnceLock, time};

use application::{api, config, Args, Config};
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    Extension,
};
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    init_logging();

    _ = start().await;
}

/// Splits log output: warnings and errors go to `stderr`, the rest to
/// `stdout`, both capped by [`LOG_LEVEL`].
fn init_logging() {
    let enabled = |to_stderr: bool| {
        filter_fn(move |meta| {
            meta.is_span()
                || STDERR_LEVELS.contains(meta.level()) == to_stderr
                    && LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO)
                        >= *meta.level()
        })
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(enabled(false)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(enabled(true)),
        )
        .init();
}

async fn start() -> Result<(), ()> {
    let Args { config, port } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        mut server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;
    if let Some(port) = port {
        server.port = port;
    }

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;
    let report = migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;
    log::info!(
        "applied {} database migration(s)",
        report.applied_migrations().len(),
    );

    let app = api::router()
        .layer(Extension(Service::new(service.into(), postgres)))
        .layer(DefaultBodyLimit::max(server.body_limit))
        .layer(cors(&server.cors)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(log_response),
        );

    let listener = TcpListener::bind((server.host.as_str(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;
    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app).await.map_err(|e| {
        log::error!("webserver failed: {e}");
    })
}

/// Builds a [`CorsLayer`] allowing the configured origins.
fn cors(conf: &config::Cors) -> Result<CorsLayer, ()> {
    conf.origins.iter().try_fold(
        CorsLayer::new()
            .allow_methods([
                http::Method::GET,
                http::Method::OPTIONS,
                http::Method::POST,
            ])
            .allow_headers([http::header::CONTENT_TYPE]),
        |cors, origin| {
            let origin = origin.parse::<http::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not a valid CORS origin: {e}");
            })?;
            Ok(cors.allow_origin(origin))
        },
    )
}

/// Opens a tracing span for the provided HTTP request.
fn request_span(r: &http::Request<Body>) -> log::Span {
    log::info_span!(
        "HTTP request",
        http.client_ip = InsecureClientIp::from(r.headers(), r.extensions())
            .map(|ip| ip.0.to_string())
            .ok(),
        http.method = r.method().as_str(),
        http.route = r
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        http.target = r
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = r
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok()),
        http.status_code = log::field::Empty,
    )
}

/// Records the status of the provided HTTP response in its request span.
fn log_response(r: &http::Response<Body>, dur: time::Duration, span: &log::Span) {
    let status = r.status();
    _ = span.record("http.status_code", status.as_u16());

    let duration = format!("{}ms", dur.as_millis());
    if status.is_server_error() {
        log::error!(duration = duration.as_str());
    } else if status.is_client_error() {
        log::warn!(duration = duration.as_str());
    } else {
        log::info!(duration = duration.as_str());
    }
}
