//! [`Query`] for searching [`Estate`]s within a freehand [`Polygon`].

use std::sync::Arc;

use common::{
    operations::{By, Select},
    BoundingBox, Coordinate, Polygon,
};
use derive_more::{Display, Error, From};
use futures::{stream, StreamExt as _, TryStreamExt as _};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::Estate,
    infra::{database, Database},
    read::estate::{
        nazotte::{self, Containment, IsWithin},
        Found, TotalCount,
    },
    Query, Service,
};

/// [`Query`] for searching [`Estate`]s within a freehand [`Polygon`].
///
/// Candidates are pre-filtered by the [`BoundingBox`] of the [`Polygon`] and
/// then checked for the exact containment one by one, keeping the order the
/// candidates were returned in.
#[derive(Clone, Debug)]
pub struct SearchEstatesInPolygon {
    /// Vertices of the [`Polygon`] to search within.
    pub coordinates: Vec<Coordinate>,
}

impl<Db> Query<SearchEstatesInPolygon> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Estate>, BoundingBox>>,
            Ok = Vec<Estate>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<IsWithin, Containment>>,
            Ok = IsWithin,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Found;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: SearchEstatesInPolygon,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let polygon = Polygon::new(query.coordinates)
            .ok_or(E::EmptyPolygon)
            .map_err(tracerr::wrap!())?;
        let bbox = polygon.bounding_box();

        let candidates = self
            .database()
            .execute(Select(By::<Vec<Estate>, _>::new(bbox)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::debug!(
            "{} `Estate` candidates found within `{bbox}`",
            candidates.len(),
        );

        let polygon = Arc::new(polygon);
        let points = candidates.iter().map(|e| e.location).collect::<Vec<_>>();
        let db = self.database();
        let within = stream::iter(points)
            .map(move |point| {
                db.execute(Select(By::<IsWithin, _>::new(Containment {
                    polygon: Arc::clone(&polygon),
                    point,
                })))
            })
            .buffered(self.config().containment_concurrency.max(1))
            .try_collect::<Vec<_>>()
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let estates = candidates
            .into_iter()
            .zip(within)
            .filter_map(|(estate, within)| (*within).then_some(estate))
            .take(nazotte::LIMIT)
            .collect::<Vec<_>>();

        Ok(Found {
            count: TotalCount::of(&estates),
            estates,
        })
    }
}

/// Error of [`SearchEstatesInPolygon`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Polygon`] has no vertices.
    #[display("`Polygon` has no vertices")]
    EmptyPolygon,
}
