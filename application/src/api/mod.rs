//! HTTP API definitions.

pub mod chair;
pub mod estate;
pub mod initialize;

use axum::{
    extract::Multipart,
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;

use crate::{define_error, AsError, Error};

define_error! {
    enum UploadError {
        #[code = "MISSING_CSV_FIELD"]
        #[status = BAD_REQUEST]
        #[message = "Multipart form doesn't contain the expected CSV field"]
        MissingField,
    }
}

/// Creates a [`Router`] serving the HTTP API.
///
/// Handlers expect the [`Service`] to be provided as an [`Extension`].
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    Router::new()
        .route("/initialize", post(initialize::reset))
        .route("/api/estate", post(estate::create))
        .route("/api/estate/low_priced", get(estate::low_priced))
        .route("/api/estate/search", get(estate::search))
        .route(
            "/api/estate/search/condition",
            get(estate::search_condition),
        )
        .route("/api/estate/nazotte", post(estate::search_in_polygon))
        .route("/api/estate/req_doc/:id", post(estate::request_document))
        .route("/api/estate/:id", get(estate::by_id))
        .route("/api/recommended_estate/:id", get(estate::recommended))
        .route("/api/chair", post(chair::create))
}

/// Reads header-less CSV records from the `name`d field of the provided
/// [`Multipart`] form.
///
/// # Errors
///
/// If the form is malformed, lacks the `name`d field, or the field contains
/// malformed records.
pub(crate) async fn read_csv<R>(
    mut form: Multipart,
    name: &str,
) -> Result<Vec<R>, Error>
where
    R: DeserializeOwned,
{
    while let Some(field) =
        form.next_field().await.map_err(AsError::into_error)?
    {
        if field.name() != Some(name) {
            continue;
        }
        let bytes = field.bytes().await.map_err(AsError::into_error)?;
        return parse_csv(&bytes).map_err(AsError::into_error);
    }
    Err(UploadError::MissingField.into())
}

/// Parses header-less CSV records.
fn parse_csv<R>(bytes: &[u8]) -> Result<Vec<R>, csv::Error>
where
    R: DeserializeOwned,
{
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes)
        .into_deserialize()
        .collect()
}
