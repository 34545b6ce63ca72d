//! Car-sale submission endpoint.
//!
//! Accepts the website's multipart form (text fields plus up to ten file
//! parts named `files`), dispatches it to every configured channel, and
//! reports the per-channel outcome. Partial channel failure is still an
//! HTTP 200; a staging rejection or an internal fault is a 500 with
//! `success: false` in the body.

use std::collections::HashMap;

use axum::extract::{Multipart, State};
use axum::Json;
use carbazar_core::models::{ChannelOutcome, DispatchStatus, SubmissionForm};
use carbazar_core::AppError;
use carbazar_storage::RawPart;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::DispatchState;

/// Multipart field name carrying file attachments.
const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    /// True only when every channel delivered.
    pub success: bool,
    pub status: DispatchStatus,
    pub per_channel: Vec<ChannelOutcome>,
}

/// Submit a car for sale.
///
/// Text fields are collected into the submission form (unknown fields are
/// ignored); every part named `files` becomes an attachment. The response
/// carries one outcome per configured channel.
#[utoipa::path(
    post,
    path = "/api/submissions",
    tag = "submissions",
    request_body(content = inline(SubmissionForm), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Submission dispatched (check per-channel outcomes)", body = SubmissionResponse),
        (status = 400, description = "Malformed multipart body", body = ErrorResponse),
        (status = 500, description = "Rejected at staging or internal error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(dispatch, multipart), fields(operation = "submit_car_sale"))]
pub async fn submit_car_sale(
    State(dispatch): State<DispatchState>,
    mut multipart: Multipart,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut parts: Vec<RawPart> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(HttpAppError::from)? {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };
        if name == FILES_FIELD {
            let filename = field.file_name().unwrap_or("file").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(HttpAppError::from)?.to_vec();
            parts.push(RawPart {
                filename,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(HttpAppError::from)?;
            fields.insert(name, value);
        }
    }

    let form = SubmissionForm::from_fields(fields);

    // Detached task: a dropped client connection must not cancel in-flight
    // sends or the staged-file cleanup.
    let dispatcher = dispatch.dispatcher.clone();
    let report = tokio::spawn(async move { dispatcher.dispatch(form, parts).await })
        .await
        .map_err(|e| {
            HttpAppError(AppError::Internal(format!("Dispatch task failed: {}", e)))
        })?
        .map_err(HttpAppError::from)?;

    Ok(Json(SubmissionResponse {
        success: report.status == DispatchStatus::Completed,
        status: report.status,
        per_channel: report.outcomes,
    }))
}
