//! [`Command`] for requesting documents of an [`Estate`].

use common::operations::{By, Select};
use derive_more::{AsRef, Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{estate, Estate},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for requesting documents of an [`Estate`] to be sent to the
/// provided [`Email`].
#[derive(Clone, Debug)]
pub struct RequestEstateDocument {
    /// ID of the [`Estate`] to request documents of.
    pub estate_id: estate::Id,

    /// [`Email`] to send the documents to.
    pub email: Email,
}

impl<Db> Command<RequestEstateDocument> for Service<Db>
where
    Db: Database<
        Select<By<Option<Estate>, estate::Id>>,
        Ok = Option<Estate>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestEstateDocument,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestEstateDocument { estate_id, email } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<Estate>, _>::new(estate_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::EstateNotExists(estate_id))
                .map_err(tracerr::wrap!())?,
        );

        log::info!("documents of `Estate(id: {estate_id})` requested to {email}");
        Ok(())
    }
}

/// Error of [`RequestEstateDocument`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Estate`] with the provided ID does not exist.
    #[display("`Estate(id: {_0})` does not exist")]
    EstateNotExists(#[error(not(source))] estate::Id),
}

/// Email address documents are sent to.
///
/// Any string is accepted, as the address is only recorded.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);
