//! [`Command`] for creating new [`Chair`]s.

use common::operations::{Commit, Insert, Transact, Transacted};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::Chair,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating new [`Chair`]s in a single transaction.
#[derive(Clone, Debug)]
pub struct CreateChairs {
    /// [`Chair`]s to create.
    pub chairs: Vec<Chair>,
}

impl<Db> Command<CreateChairs> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Chair>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateChairs) -> Result<Self::Ok, Self::Err> {
        let CreateChairs { chairs } = cmd;
        let count = chairs.len();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        for chair in chairs {
            tx.execute(Insert(chair))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        log::debug!("{count} `Chair`s created");
        Ok(())
    }
}

/// Error of [`CreateChairs`] [`Command`] execution.
pub type ExecutionError = database::Error;
