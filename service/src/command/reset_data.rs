//! [`Command`] for removing every [`Estate`] and [`Chair`].

use common::operations::{By, Commit, Delete, Transact, Transacted};
use tracerr::Traced;

use crate::{
    domain::{Chair, Estate},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing every [`Estate`] and [`Chair`] in a single
/// transaction.
#[derive(Clone, Copy, Debug)]
pub struct ResetData;

impl<Db> Command<ResetData> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Delete<By<Vec<Estate>, ()>>,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Vec<Chair>, ()>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: ResetData) -> Result<Self::Ok, Self::Err> {
        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Delete(By::<Vec<Estate>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Delete(By::<Vec<Chair>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Error of [`ResetData`] [`Command`] execution.
pub type ExecutionError = database::Error;
