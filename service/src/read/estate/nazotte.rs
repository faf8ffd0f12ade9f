//! Nazotte (freehand polygon) search definitions.

use std::sync::Arc;

use common::{Coordinate, Polygon};
use derive_more::Deref;

#[cfg(doc)]
use crate::domain::Estate;

/// Maximum number of [`Estate`]s returned by a nazotte search.
pub const LIMIT: usize = 50;

/// Selector checking whether a point lies within a [`Polygon`].
#[derive(Clone, Debug)]
pub struct Containment {
    /// [`Polygon`] drawn by a user.
    pub polygon: Arc<Polygon>,

    /// Location of an [`Estate`] to check.
    pub point: Coordinate,
}

/// Indicator whether a point lies within a [`Polygon`].
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsWithin(pub bool);
