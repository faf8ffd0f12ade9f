//! [`Command`] for creating new [`Estate`]s.

use common::operations::{Commit, Insert, Transact, Transacted};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::Estate,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating new [`Estate`]s in a single transaction.
#[derive(Clone, Debug)]
pub struct CreateEstates {
    /// [`Estate`]s to create.
    pub estates: Vec<Estate>,
}

impl<Db> Command<CreateEstates> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Estate>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateEstates) -> Result<Self::Ok, Self::Err> {
        let CreateEstates { estates } = cmd;
        let count = estates.len();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        for estate in estates {
            tx.execute(Insert(estate))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        log::debug!("{count} `Estate`s created");
        Ok(())
    }
}

/// Error of [`CreateEstates`] [`Command`] execution.
pub type ExecutionError = database::Error;
