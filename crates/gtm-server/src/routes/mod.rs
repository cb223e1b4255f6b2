pub mod configs;
pub mod escalations;
pub mod events;
pub mod health;
pub mod status;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Unwrap a JSON body, turning any extraction failure (bad JSON, missing
/// field, unknown enum value, wrong content type) into a 400.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(v)| v)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}
