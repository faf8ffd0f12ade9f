//! [`Query`] collection related to the multiple [`Estate`]s.

use common::operations::By;

use crate::{domain::Estate, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the [`read::estate::LIST_LIMIT`] cheapest [`Estate`]s.
pub type LowPriced = DatabaseQuery<By<Vec<Estate>, read::estate::LowPriced>>;
