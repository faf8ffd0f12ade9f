//! [`Query`] for recommending [`Estate`]s a [`Chair`] fits into.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{chair, Chair, Estate},
    infra::{database, Database},
    read::estate::Recommended,
    Query, Service,
};

/// [`Query`] for recommending the most popular [`Estate`]s the [`Chair`] can
/// be carried into.
#[derive(Clone, Copy, Debug)]
pub struct RecommendEstates {
    /// ID of the [`Chair`] to recommend [`Estate`]s for.
    pub chair_id: chair::Id,
}

impl<Db> Query<RecommendEstates> for Service<Db>
where
    Db: Database<
            Select<By<Option<Chair>, chair::Id>>,
            Ok = Option<Chair>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Estate>, Recommended>>,
            Ok = Vec<Estate>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Estate>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        RecommendEstates { chair_id }: RecommendEstates,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let chair = self
            .database()
            .execute(Select(By::<Option<Chair>, _>::new(chair_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ChairNotExists(chair_id))
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Select(By::<Vec<Estate>, _>::new(Recommended(
                chair.dimensions.rank(),
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RecommendEstates`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Chair`] with the provided ID does not exist.
    #[display("`Chair(id: {_0})` does not exist")]
    ChairNotExists(#[error(not(source))] chair::Id),
}
