use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

use crate::data::dates::parse_date;
use crate::models::ErrorResponse;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Invalid request data
    ValidationError(String),
    /// Unknown race
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => ("validation_error", msg.clone()),
            AppError::NotFound(msg) => ("not_found", msg.clone()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message,
        })
    }
}

/// Validation functions
pub fn validate_date(raw: &str) -> Result<NaiveDate, AppError> {
    parse_date(raw).ok_or_else(|| {
        AppError::ValidationError(format!("Date must be YYYYMMDD, got {:?}", raw))
    })
}

pub fn validate_horse_ids(horse_ids: &[String]) -> Result<(), AppError> {
    if horse_ids.is_empty() {
        return Err(AppError::ValidationError(
            "At least one horse id required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for id in horse_ids {
        if id.trim().is_empty() {
            return Err(AppError::ValidationError("Horse id must not be blank".to_string()));
        }
        if !seen.insert(id.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Duplicate horse id {}",
                id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_date_valid() {
        assert_eq!(
            validate_date("20250504").unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 4).unwrap()
        );
        assert!(validate_date("2025-05-04").is_ok());
    }

    #[test]
    fn test_validate_date_invalid() {
        assert!(validate_date("").is_err());
        assert!(validate_date("20251340").is_err());
        assert!(validate_date("tomorrow").is_err());
    }

    #[test]
    fn test_validate_horse_ids_valid() {
        assert!(validate_horse_ids(&ids(&["h1", "h2", "h3"])).is_ok());
    }

    #[test]
    fn test_validate_horse_ids_invalid() {
        assert!(validate_horse_ids(&[]).is_err());
        assert!(validate_horse_ids(&ids(&["h1", "h1"])).is_err());
        assert!(validate_horse_ids(&ids(&["h1", " "])).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = AppError::ValidationError("test error".to_string());
        assert!(err.to_string().contains("Validation error"));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::ValidationError("".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
