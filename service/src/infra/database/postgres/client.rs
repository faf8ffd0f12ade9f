//! Postgres database clients.

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

use super::connection;

/// Postgres client able to run statements.
pub trait Connection {
    /// Queries the provided statement with the given parameters and returns the
    /// resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to query the statement.
    fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Queries the provided statement with the given parameters and returns the
    /// optional resulting row.
    ///
    /// # Errors
    ///
    /// If failed to query the statement.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Executes the provided statement with the given parameters and returns
    /// the number of affected rows.
    ///
    /// # Errors
    ///
    /// If failed to execute the statement.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;
}

/// Non-transactional Postgres client.
///
/// Every statement is run on a separate connection taken from the
/// [`connection::Pool`], so statements issued concurrently don't wait for
/// each other.
#[derive(Clone, Debug)]
pub struct Pooled {
    /// [`connection::Pool`] to take connections from.
    pub(crate) pool: connection::Pool,
}

impl Pooled {
    /// Creates a new [`Pooled`] client on top of the provided
    /// [`connection::Pool`].
    #[must_use]
    pub(crate) fn new(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Takes a free connection from the [`connection::Pool`].
    pub(crate) async fn connection(
        &self,
    ) -> Result<connection::Pooled, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for Pooled {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.connection()
            .await
            .map_err(tracerr::wrap!())?
            .execute(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

/// Transactional Postgres client.
///
/// The [`connection::Transaction`] is opened lazily on the first statement,
/// and is shared between all the clones of this [`Tx`].
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`Pooled`] client to take a connection for the transaction from.
    pooled: Pooled,

    /// Opened [`connection::Transaction`], if any.
    transaction: Arc<RwLock<Option<connection::Transaction>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client taking its connection from the provided
    /// [`Pooled`] client.
    #[must_use]
    pub fn new(pooled: Pooled) -> Self {
        Self {
            pooled,
            transaction: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the [`connection::Transaction`] of this [`Tx`] client, opening
    /// it if necessary.
    async fn transaction(
        &self,
    ) -> Result<
        RwLockReadGuard<'_, connection::Transaction>,
        Traced<database::Error>,
    > {
        let opened = self.transaction.read().await;
        if opened.is_some() {
            return Ok(RwLockReadGuard::map(opened, |tx| {
                tx.as_ref().expect("checked above")
            }));
        }
        drop(opened);

        let mut opened = self.transaction.write().await;
        if opened.is_none() {
            let connection = self
                .pooled
                .connection()
                .await
                .map_err(tracerr::wrap!())?;
            *opened = Some(
                connection::Transaction::begin(connection)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        Ok(RwLockReadGuard::map(opened.downgrade(), |tx| {
            tx.as_ref().expect("opened above")
        }))
    }

    /// Commits the transaction of this [`Tx`] client, if it was opened.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.transaction.write().await.take() else {
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.transaction()
            .await
            .map_err(tracerr::wrap!())?
            .get()
            .query(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.transaction()
            .await
            .map_err(tracerr::wrap!())?
            .get()
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.transaction()
            .await
            .map_err(tracerr::wrap!())?
            .get()
            .execute(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}
