/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::AppState;
use crate::error::WebError;

/// Lets a request through only if its `Authorization` header carries the
/// shared notification token that was written into the build plans.
pub async fn authorize_notification(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response<Body>, WebError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(str::trim);

    match token {
        Some(token) if !token.is_empty() && token == state.notification_token.as_str() => {
            Ok(next.run(req).await)
        }
        Some(_) => {
            warn!("Build notification with wrong token");
            Err(WebError::invalid_token())
        }
        None => Err(WebError::Unauthorized(
            "Authorization header not found".to_string(),
        )),
    }
}
