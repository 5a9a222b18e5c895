use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod handlers;

use handlers::{bias, health};
use pacebias::core::PaceBiasAnalyzer;
use pacebias::data::{CachedHistory, FreshnessPolicy, HistoryFile, RosterData};

const DEFAULT_HISTORY_PATH: &str = "data/history.csv";
const DEFAULT_ROSTER_PATH: &str = "data/roster.csv";

/// Application state shared across handlers
pub struct AppState {
    pub analyzer: PaceBiasAnalyzer<CachedHistory<HistoryFile>>,
    pub roster: Option<RosterData>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(std::io::Error::other)?;

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", host, port);

    let history_path =
        std::env::var("PACEBIAS_HISTORY").unwrap_or_else(|_| DEFAULT_HISTORY_PATH.to_string());
    let roster_path =
        std::env::var("PACEBIAS_ROSTER").unwrap_or_else(|_| DEFAULT_ROSTER_PATH.to_string());

    info!("Loading race history from {}", history_path);
    let history = HistoryFile::open(&history_path).map_err(std::io::Error::other)?;

    // Cached horses are re-read from the file once stale; a broken file keeps serving the old copy
    let history = CachedHistory::new(
        history,
        FreshnessPolicy {
            serve_stale_on_error: true,
            ..Default::default()
        },
    );

    // Only GET /races/{race_id}/bias needs the roster
    let roster = match RosterData::load(&roster_path) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!("Failed to load roster from {}: {}. Race lookups disabled.", roster_path, e);
            None
        }
    };

    let app_state = Arc::new(AppState {
        analyzer: PaceBiasAnalyzer::with_defaults(history),
        roster,
    });

    info!("Starting Pacebias API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health::health_check))
            .route("/bias", web::post().to(bias::score_request))
            .route("/races/{race_id}/bias", web::get().to(bias::score_race))
    })
    .bind(&addr)?
    .run()
    .await
}
