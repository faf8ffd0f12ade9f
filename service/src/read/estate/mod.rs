//! [`Estate`]-related read definitions.

pub mod nazotte;
pub mod search;

use derive_more::{Display, From, Into};

use crate::domain::{chair, Estate};

/// Maximum number of [`Estate`]s in a single non-paginated list.
pub const LIST_LIMIT: usize = 20;

/// Selector of the cheapest [`Estate`]s, ordered by their rent.
#[derive(Clone, Copy, Debug)]
pub struct LowPriced;

/// Selector of the most popular [`Estate`]s a chair of the provided
/// [`chair::Ranked`] dimensions can be carried into.
#[derive(Clone, Copy, Debug, From)]
pub struct Recommended(pub chair::Ranked);

/// Total count of [`Estate`]s matching a search.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, Hash, Into, PartialEq,
)]
pub struct TotalCount(i64);

impl TotalCount {
    /// Counts the provided `items`, saturating at [`i64::MAX`].
    #[must_use]
    pub fn of<T>(items: &[T]) -> Self {
        Self(i64::try_from(items.len()).unwrap_or(i64::MAX))
    }
}

/// [`Estate`]s found by a search.
#[derive(Clone, Debug, Default)]
pub struct Found {
    /// [`TotalCount`] of the [`Estate`]s matching the search.
    pub count: TotalCount,

    /// Returned [`Estate`]s.
    pub estates: Vec<Estate>,
}
