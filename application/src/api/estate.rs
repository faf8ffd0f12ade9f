//! [`Estate`]-related definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Multipart, Path, Query,
    },
    Extension, Json,
};
use common::{Coordinate, Handler as _};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, request_estate_document::Email},
    domain, query, read,
};

use crate::{api, define_error, AsError, Error, Service};

/// Estate listed for rent.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estate {
    /// Unique identifier of this [`Estate`].
    pub id: i64,

    /// Thumbnail image path of this [`Estate`].
    pub thumbnail: String,

    /// Name of this [`Estate`].
    pub name: String,

    /// Description of this [`Estate`].
    pub description: String,

    /// Latitude of this [`Estate`].
    pub latitude: f64,

    /// Longitude of this [`Estate`].
    pub longitude: f64,

    /// Address of this [`Estate`].
    pub address: String,

    /// Monthly rent of this [`Estate`].
    pub rent: i64,

    /// Door height of this [`Estate`].
    pub door_height: i64,

    /// Door width of this [`Estate`].
    pub door_width: i64,

    /// Comma-separated features of this [`Estate`].
    pub features: String,
}

impl From<domain::Estate> for Estate {
    fn from(estate: domain::Estate) -> Self {
        let domain::Estate {
            id,
            name,
            description,
            thumbnail,
            address,
            location,
            rent,
            door,
            features,
            popularity: _,
        } = estate;

        Self {
            id: id.into(),
            thumbnail: thumbnail.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
            address: address.to_string(),
            rent,
            door_height: door.height,
            door_width: door.width,
            features: features.to_string(),
        }
    }
}

/// [`Estate`]s found by a search.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Found {
    /// Total count of the [`Estate`]s matching the search.
    pub count: i64,

    /// Returned [`Estate`]s.
    pub estates: Vec<Estate>,
}

impl From<read::estate::Found> for Found {
    fn from(found: read::estate::Found) -> Self {
        Self {
            count: found.count.into(),
            estates: found.estates.into_iter().map(Into::into).collect(),
        }
    }
}

/// List of [`Estate`]s.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct List {
    /// Listed [`Estate`]s.
    pub estates: Vec<Estate>,
}

impl From<Vec<domain::Estate>> for List {
    fn from(estates: Vec<domain::Estate>) -> Self {
        Self {
            estates: estates.into_iter().map(Into::into).collect(),
        }
    }
}

define_error! {
    enum EstateError {
        #[code = "ESTATE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Estate` with the provided ID does not exist"]
        NotExists,
    }
}

/// Returns an [`Estate`] by its ID.
///
/// # Errors
///
/// If the ID is not an integer or the [`Estate`] doesn't exist.
#[tracing::instrument(skip_all, fields(http.handler = "estate.by_id"))]
pub async fn by_id(
    Extension(service): Extension<Service>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Estate>, Error> {
    let Path(id) = id.map_err(AsError::into_error)?;

    service
        .execute(query::estate::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| EstateError::NotExists.into())
        .map(|e| Json(e.into()))
}

/// Returns the cheapest [`Estate`]s.
///
/// # Errors
///
/// If the [`Service`] fails.
#[tracing::instrument(skip_all, fields(http.handler = "estate.low_priced"))]
pub async fn low_priced(
    Extension(service): Extension<Service>,
) -> Result<Json<List>, Error> {
    service
        .execute(query::estates::LowPriced::by(read::estate::LowPriced))
        .await
        .map_err(AsError::into_error)
        .map(|estates| Json(estates.into()))
}

/// Query parameters of the [`search`] handler.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchParams {
    /// Selected door height range ID.
    pub door_height_range_id: Option<String>,

    /// Selected door width range ID.
    pub door_width_range_id: Option<String>,

    /// Selected rent range ID.
    pub rent_range_id: Option<String>,

    /// Comma-separated required features.
    pub features: Option<String>,

    /// Zero-based number of the requested page.
    pub page: Option<String>,

    /// Number of [`Estate`]s per page.
    pub per_page: Option<String>,
}

define_error! {
    enum SearchParamsError {
        #[code = "INVALID_PAGE"]
        #[status = BAD_REQUEST]
        #[message = "`page` must be an integer"]
        Page,

        #[code = "INVALID_PER_PAGE"]
        #[status = BAD_REQUEST]
        #[message = "`perPage` must be an integer"]
        PerPage,
    }
}

impl TryFrom<SearchParams> for query::SearchEstates {
    type Error = Error;

    fn try_from(params: SearchParams) -> Result<Self, Self::Error> {
        let SearchParams {
            door_height_range_id,
            door_width_range_id,
            rent_range_id,
            features,
            page,
            per_page,
        } = params;

        Ok(Self {
            filter: read::estate::search::Filter {
                door_height_range_id,
                door_width_range_id,
                rent_range_id,
                features,
            },
            page: page
                .as_deref()
                .and_then(|p| p.parse().ok())
                .ok_or(SearchParamsError::Page)?,
            per_page: per_page
                .as_deref()
                .and_then(|p| p.parse().ok())
                .ok_or(SearchParamsError::PerPage)?,
        })
    }
}

/// Searches [`Estate`]s by ranges and features.
///
/// # Errors
///
/// If the search parameters are invalid or the [`Service`] fails.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "estate.search",
        search.params = ?params,
    ),
)]
pub async fn search(
    Extension(service): Extension<Service>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Found>, Error> {
    let Query(params) = params.map_err(AsError::into_error)?;

    service
        .execute(query::SearchEstates::try_from(params)?)
        .await
        .map_err(AsError::into_error)
        .map(|found| Json(found.into()))
}

/// Returns the conditions [`Estate`]s can be searched by.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
#[tracing::instrument(skip_all, fields(http.handler = "estate.search_condition"))]
pub async fn search_condition(
    Extension(service): Extension<Service>,
) -> Json<read::estate::search::Condition> {
    Json(service.config().estate_search_condition.clone())
}

/// Body of the [`search_in_polygon`] request.
#[derive(Clone, Debug, Deserialize)]
pub struct PolygonBody {
    /// Vertices of the polygon to search within.
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
}

/// Searches [`Estate`]s within a freehand polygon.
///
/// # Errors
///
/// If the polygon has no vertices or the [`Service`] fails.
#[tracing::instrument(skip_all, fields(http.handler = "estate.nazotte"))]
pub async fn search_in_polygon(
    Extension(service): Extension<Service>,
    body: Result<Json<PolygonBody>, JsonRejection>,
) -> Result<Json<Found>, Error> {
    let Json(PolygonBody { coordinates }) =
        body.map_err(AsError::into_error)?;

    service
        .execute(query::SearchEstatesInPolygon { coordinates })
        .await
        .map_err(AsError::into_error)
        .map(|found| Json(found.into()))
}

/// Body of the [`request_document`] request.
#[derive(Clone, Debug, Deserialize)]
pub struct DocumentRequest {
    /// Email address to send the documents to.
    pub email: Option<String>,
}

define_error! {
    enum DocumentRequestError {
        #[code = "MISSING_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "`email` must be a string"]
        MissingEmail,
    }
}

/// Requests documents of an [`Estate`].
///
/// # Errors
///
/// If the request is malformed, the [`Estate`] doesn't exist, or the
/// [`Service`] fails.
#[tracing::instrument(skip_all, fields(http.handler = "estate.req_doc"))]
pub async fn request_document(
    Extension(service): Extension<Service>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<http::StatusCode, Error> {
    let Json(DocumentRequest { email }) = body.map_err(AsError::into_error)?;
    let email = email
        .map(Email::from)
        .ok_or(DocumentRequestError::MissingEmail)?;
    let Path(id) = id.map_err(AsError::into_error)?;

    service
        .execute(command::RequestEstateDocument {
            estate_id: id.into(),
            email,
        })
        .await
        .map_err(AsError::into_error)
        .map(|()| http::StatusCode::OK)
}

/// Returns [`Estate`]s the chair with the provided ID can be carried into.
///
/// # Errors
///
/// If the ID is not an integer, the chair doesn't exist, or the [`Service`]
/// fails.
#[tracing::instrument(skip_all, fields(http.handler = "estate.recommended"))]
pub async fn recommended(
    Extension(service): Extension<Service>,
    chair_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<List>, Error> {
    let Path(chair_id) = chair_id.map_err(AsError::into_error)?;

    service
        .execute(query::RecommendEstates {
            chair_id: chair_id.into(),
        })
        .await
        .map_err(AsError::into_error)
        .map(|estates| Json(estates.into()))
}

/// CSV record of an [`Estate`].
#[derive(Clone, Debug, Deserialize)]
struct Record {
    id: i64,
    name: String,
    description: String,
    thumbnail: String,
    address: String,
    latitude: f64,
    longitude: f64,
    rent: i64,
    door_height: i64,
    door_width: i64,
    features: String,
    popularity: i64,
}

impl TryFrom<Record> for domain::Estate {
    type Error = Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let Record {
            id,
            name,
            description,
            thumbnail,
            address,
            latitude,
            longitude,
            rent,
            door_height,
            door_width,
            features,
            popularity,
        } = record;
        let invalid =
            |e: &str| Error::bad_request(&format!("{e} in `Estate({id})`"));

        Ok(Self {
            id: id.into(),
            name: name.parse().map_err(invalid)?,
            description: description.parse().map_err(invalid)?,
            thumbnail: thumbnail.parse().map_err(invalid)?,
            address: address.parse().map_err(invalid)?,
            location: Coordinate::new(latitude, longitude),
            rent,
            door: domain::estate::Door {
                height: door_height,
                width: door_width,
            },
            features: features.parse().map_err(invalid)?,
            popularity,
        })
    }
}

/// Creates [`Estate`]s out of the uploaded CSV.
///
/// # Errors
///
/// If the CSV is malformed or the [`Service`] fails.
#[tracing::instrument(skip_all, fields(http.handler = "estate.create"))]
pub async fn create(
    Extension(service): Extension<Service>,
    form: Multipart,
) -> Result<http::StatusCode, Error> {
    let estates = api::read_csv::<Record>(form, "estates")
        .await?
        .into_iter()
        .map(domain::Estate::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    service
        .execute(command::CreateEstates { estates })
        .await
        .map_err(AsError::into_error)
        .map(|()| http::StatusCode::CREATED)
}

impl AsError for query::search_estates::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidCondition(_) | Self::InvalidPagination { .. } => {
                Some(Error::bad_request(self))
            }
        }
    }
}

impl AsError for query::search_estates_in_polygon::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmptyPolygon => Some(Error::bad_request(self)),
        }
    }
}

impl AsError for query::recommend_estates::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CHAIR_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Chair` with the provided ID does not exist"]
                ChairNotExists,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ChairNotExists(_) => Some(Error::ChairNotExists.into()),
        }
    }
}

impl AsError for command::request_estate_document::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EstateNotExists(_) => Some(EstateError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Coordinate;
    use service::domain::{self, estate};

    use super::{
        api, DocumentRequest, DocumentRequestError, Estate, Found, Record,
        SearchParams, SearchParamsError,
    };

    #[test]
    fn takes_any_email_string() {
        let request: DocumentRequest =
            serde_json::from_str(r#"{"email": "isuumo"}"#).unwrap();
        assert_eq!(request.email.as_deref(), Some("isuumo"));

        let request: DocumentRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.email, None);

        let err = crate::Error::from(DocumentRequestError::MissingEmail);
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn serializes_estate_in_camel_case() {
        let estate = domain::Estate {
            id: 7_i64.into(),
            name: estate::Name::new("椅子の家").unwrap(),
            description: estate::Description::new("desc").unwrap(),
            thumbnail: estate::Thumbnail::new("/images/7.png").unwrap(),
            address: estate::Address::new("東京都").unwrap(),
            location: Coordinate::new(35.5, 139.25),
            rent: 70_000,
            door: estate::Door {
                height: 120,
                width: 90,
            },
            features: estate::Features::new("駐車場あり").unwrap(),
            popularity: 100,
        };

        let json = serde_json::to_value(Found {
            count: 1,
            estates: vec![Estate::from(estate)],
        })
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "count": 1,
                "estates": [{
                    "id": 7,
                    "thumbnail": "/images/7.png",
                    "name": "椅子の家",
                    "description": "desc",
                    "latitude": 35.5,
                    "longitude": 139.25,
                    "address": "東京都",
                    "rent": 70_000,
                    "doorHeight": 120,
                    "doorWidth": 90,
                    "features": "駐車場あり",
                }],
            }),
        );
    }

    #[test]
    fn converts_csv_records() {
        let records = api::parse_csv::<Record>(
            "1,家,説明,/images/1.png,東京都,35.1,139.2,50000,100,80,\
             \"最上階,防犯カメラ\",12\n"
                .as_bytes(),
        )
        .unwrap();
        let estate =
            domain::Estate::try_from(records.into_iter().next().unwrap())
                .unwrap();

        assert_eq!(i64::from(estate.id), 1);
        assert_eq!(estate.location, Coordinate::new(35.1, 139.2));
        assert_eq!(estate.door.width, 80);
        assert!(estate.features.contains("防犯カメラ"));
        assert_eq!(estate.popularity, 12);
    }

    #[test]
    fn rejects_too_long_text() {
        let record = Record {
            id: 1,
            name: "x".repeat(65),
            description: String::new(),
            thumbnail: String::new(),
            address: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            rent: 0,
            door_height: 0,
            door_width: 0,
            features: String::new(),
            popularity: 0,
        };

        let err = domain::Estate::try_from(record).unwrap_err();
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn requires_integer_pagination() {
        let params = SearchParams {
            rent_range_id: Some("1".to_owned()),
            page: Some("0".to_owned()),
            per_page: Some("twenty".to_owned()),
            ..SearchParams::default()
        };

        let err = service::query::SearchEstates::try_from(params).unwrap_err();
        assert_eq!(err.code, crate::Error::from(SearchParamsError::PerPage).code);
    }
}
