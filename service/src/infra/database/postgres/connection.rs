//! Raw Postgres connection definitions.

use std::fmt;

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as Pooled, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Transaction opened on a [`Pooled`] connection.
///
/// Owns the [`Pooled`] connection for the whole lifetime of the transaction,
/// returning it to the [`Pool`] once dropped.
#[self_referencing]
pub struct Transaction {
    /// [`Pooled`] connection the transaction is opened on.
    connection: Pooled,

    /// Opened transaction, or [`None`] once committed.
    #[borrows(mut connection)]
    #[not_covariant]
    inner: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("inner", self.get())
            .finish_non_exhaustive()
    }
}

impl Transaction {
    /// Opens a new [`Transaction`] on the provided [`Pooled`] connection.
    ///
    /// # Errors
    ///
    /// If failed to issue `BEGIN`.
    pub async fn begin(
        connection: Pooled,
    ) -> Result<Self, Traced<database::Error>> {
        Self::try_new_async_send(connection, |c| {
            c.transaction().map_ok(Some).boxed()
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
    }

    /// Returns the opened [`deadpool_postgres::Transaction`].
    pub(crate) fn get(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_inner(|tx| tx.as_ref().expect("already committed"))
    }

    /// Commits this [`Transaction`].
    ///
    /// # Errors
    ///
    /// If failed to issue `COMMIT`.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        self.with_inner_mut(|tx| tx.take())
            .expect("already committed")
            .commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}
