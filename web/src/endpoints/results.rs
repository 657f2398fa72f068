/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use axum::extract::{Json, State};
use common::types::BaseResponse;
use ingest::IngestOutcome;

use crate::AppState;
use crate::error::WebResult;

/// Build result posted by a plan's notification step. The body is passed
/// on as is so rejected payloads can be logged verbatim.
pub async fn post_new_result(
    State(state): State<AppState>,
    body: String,
) -> WebResult<Json<BaseResponse<String>>> {
    let outcome = state.ingest.process_notification(&body).await?;

    let message = match outcome {
        IngestOutcome::Ingested(result) => format!("Stored result {}", result.id),
        IngestOutcome::Duplicate(result) => format!("Result {} already stored", result.id),
    };

    Ok(Json(BaseResponse {
        error: false,
        message,
    }))
}
