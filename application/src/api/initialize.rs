//! Data set reset definitions.

use axum::{Extension, Json};
use common::Handler as _;
use serde::Serialize;
use service::command;

use crate::{AsError, Error, Service};

/// Response of the [`reset`] handler.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Initialized {
    /// Language the server is implemented in.
    pub language: &'static str,
}

/// Removes every estate and chair.
///
/// # Errors
///
/// If the [`Service`] fails.
#[tracing::instrument(skip_all, fields(http.handler = "initialize"))]
pub async fn reset(
    Extension(service): Extension<Service>,
) -> Result<Json<Initialized>, Error> {
    service
        .execute(command::ResetData)
        .await
        .map_err(AsError::into_error)
        .map(|()| Json(Initialized { language: "rust" }))
}
