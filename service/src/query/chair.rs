//! [`Query`] collection related to a single [`Chair`].

use common::operations::By;

use crate::domain::{chair, Chair};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Chair`] by its [`chair::Id`].
pub type ById = DatabaseQuery<By<Option<Chair>, chair::Id>>;
