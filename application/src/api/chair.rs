//! Chair-related definitions.

use axum::{extract::Multipart, Extension};
use common::Handler as _;
use serde::Deserialize;
use service::{command, domain};

use crate::{api, AsError, Error, Service};

/// CSV record of a chair.
#[derive(Clone, Debug, Deserialize)]
struct Record {
    id: i64,
    name: String,
    description: String,
    thumbnail: String,
    price: i64,
    height: i64,
    width: i64,
    depth: i64,
    color: String,
    features: String,
    kind: String,
    popularity: i64,
    stock: i64,
}

impl TryFrom<Record> for domain::Chair {
    type Error = Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let Record {
            id,
            name,
            description,
            thumbnail,
            price,
            height,
            width,
            depth,
            color,
            features,
            kind,
            popularity,
            stock,
        } = record;
        let invalid =
            |e: &str| Error::bad_request(&format!("{e} in `Chair({id})`"));

        Ok(Self {
            id: id.into(),
            name: name.parse().map_err(invalid)?,
            description: description.parse().map_err(invalid)?,
            thumbnail: thumbnail.parse().map_err(invalid)?,
            price,
            dimensions: domain::chair::Dimensions {
                width,
                height,
                depth,
            },
            color: color.parse().map_err(invalid)?,
            features: features.parse().map_err(invalid)?,
            kind: kind.parse().map_err(invalid)?,
            popularity,
            stock,
        })
    }
}

/// Creates chairs out of the uploaded CSV.
///
/// # Errors
///
/// If the CSV is malformed or the [`Service`] fails.
#[tracing::instrument(skip_all, fields(http.handler = "chair.create"))]
pub async fn create(
    Extension(service): Extension<Service>,
    form: Multipart,
) -> Result<http::StatusCode, Error> {
    let chairs = api::read_csv::<Record>(form, "chairs")
        .await?
        .into_iter()
        .map(domain::Chair::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    service
        .execute(command::CreateChairs { chairs })
        .await
        .map_err(AsError::into_error)
        .map(|()| http::StatusCode::CREATED)
}

#[cfg(test)]
mod spec {
    use service::domain;

    use super::{api, Record};

    #[test]
    fn converts_csv_records() {
        let records = api::parse_csv::<Record>(
            "3,椅子,説明,/images/3.png,9800,110,60,55,黒,\"肘掛け,折りたたみ可\",\
             ゲーミングチェア,42,5\n"
                .as_bytes(),
        )
        .unwrap();
        let chair =
            domain::Chair::try_from(records.into_iter().next().unwrap())
                .unwrap();

        assert_eq!(i64::from(chair.id), 3);
        assert_eq!(chair.dimensions.height, 110);
        assert_eq!(chair.dimensions.width, 60);
        assert_eq!(chair.dimensions.depth, 55);
        assert_eq!(chair.kind.to_string(), "ゲーミングチェア");
        assert_eq!(chair.stock, 5);
    }
}
