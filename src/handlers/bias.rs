use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use crate::AppState;
use pacebias::data::RosterProvider;
use pacebias::error::{validate_date, validate_horse_ids, AppError};
use pacebias::models::{BiasRequest, RaceCard, RosterEntry};

/// Score an ad hoc field of horses
pub async fn score_request(
    state: web::Data<Arc<AppState>>,
    req: web::Json<BiasRequest>,
) -> Result<HttpResponse, AppError> {
    let date = validate_date(&req.date)?;
    validate_horse_ids(&req.horse_ids)?;

    let race_id = req.race_id.clone().unwrap_or_default();
    // Borrow the race name from the roster when the race is known
    let race_name = state
        .roster
        .as_ref()
        .and_then(|r| r.race(&race_id))
        .map(|card| card.race_name)
        .unwrap_or_default();

    let card = RaceCard {
        race_id,
        date,
        race_name,
        entries: req
            .horse_ids
            .iter()
            .map(|id| RosterEntry {
                horse_id: id.clone(),
                horse_name: String::new(),
            })
            .collect(),
    };

    let report = state.analyzer.analyze_race(&card);
    info!(
        "Scored {} horses for {}: {} ({})",
        card.entries.len(),
        date,
        report.score.score,
        report.score.state.as_str()
    );

    Ok(HttpResponse::Ok().json(report))
}

/// Score a race from the loaded roster
pub async fn score_race(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let race_id = path.into_inner();
    let roster = state
        .roster
        .as_ref()
        .ok_or_else(|| AppError::NotFound("No roster loaded".to_string()))?;
    let card = roster
        .race(&race_id)
        .ok_or_else(|| AppError::NotFound(format!("Unknown race {}", race_id)))?;

    let report = state.analyzer.analyze_race(&card);
    info!(
        "Scored race {}: {} ({})",
        race_id,
        report.score.score,
        report.score.state.as_str()
    );

    Ok(HttpResponse::Ok().json(report))
}
