//! [`Query`] for searching [`Estate`]s by ranges and features.

use common::{
    operations::{By, Select},
    pagination::Arguments,
};
use derive_more::{Display, Error, From};
use futures::future;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Estate;
use crate::{
    infra::{database, Database},
    read::estate::{
        search::{self, BuildError, Filter},
        Found, TotalCount,
    },
    Query, Service,
};

/// [`Query`] for searching [`Estate`]s by ranges and features.
///
/// Total count and the requested page are selected concurrently.
#[derive(Clone, Debug)]
pub struct SearchEstates {
    /// [`Filter`] to search with.
    pub filter: Filter,

    /// Zero-based number of the requested page.
    pub page: i64,

    /// Number of [`Estate`]s per page.
    pub per_page: i64,
}

impl<Db> Query<SearchEstates> for Service<Db>
where
    Db: Database<
            Select<By<search::Page, search::Selector>>,
            Ok = search::Page,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<TotalCount, search::Predicate>>,
            Ok = TotalCount,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Found;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: SearchEstates) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SearchEstates {
            filter,
            page,
            per_page,
        } = query;

        let arguments = Arguments::new(page, per_page)
            .ok_or(E::InvalidPagination { page, per_page })
            .map_err(tracerr::wrap!())?;
        let predicate = filter
            .predicate(&self.config().estate_search_condition)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        log::debug!(?predicate, ?arguments, "searching `Estate`s");

        let (count, page) = future::try_join(
            self.database()
                .execute(Select(By::<TotalCount, _>::new(predicate.clone()))),
            self.database()
                .execute(Select(By::<search::Page, _>::new(search::Selector {
                    arguments,
                    predicate,
                }))),
        )
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Found {
            count,
            estates: page.items,
        })
    }
}

/// Error of [`SearchEstates`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Search conditions are invalid.
    #[display("Invalid search conditions: {_0}")]
    #[from]
    InvalidCondition(BuildError),

    /// Pagination parameters are out of bounds.
    #[display("Invalid pagination: `page = {page}`, `per_page = {per_page}`")]
    InvalidPagination {
        /// Requested page.
        page: i64,

        /// Requested number of items per page.
        per_page: i64,
    },
}
