//! [`Estate`] definitions.

use common::Coordinate;
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use super::define_text;

/// Estate listed for rent.
#[derive(Clone, Debug, PartialEq)]
pub struct Estate {
    /// ID of this [`Estate`].
    pub id: Id,

    /// [`Name`] of this [`Estate`].
    pub name: Name,

    /// [`Description`] of this [`Estate`].
    pub description: Description,

    /// [`Thumbnail`] of this [`Estate`].
    pub thumbnail: Thumbnail,

    /// [`Address`] of this [`Estate`].
    pub address: Address,

    /// Geographic location of this [`Estate`].
    pub location: Coordinate,

    /// Monthly [`Rent`] of this [`Estate`].
    pub rent: Rent,

    /// Entrance [`Door`] of this [`Estate`].
    pub door: Door,

    /// [`Features`] of this [`Estate`].
    pub features: Features,

    /// [`Popularity`] of this [`Estate`].
    pub popularity: Popularity,
}

/// ID of an [`Estate`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

define_text! {
    #[doc = "Name of an [`Estate`]."]
    Name(max = 64)
}

define_text! {
    #[doc = "Description of an [`Estate`]."]
    Description(max = 4096)
}

define_text! {
    #[doc = "Thumbnail image path of an [`Estate`]."]
    Thumbnail(max = 128)
}

define_text! {
    #[doc = "Address of an [`Estate`]."]
    Address(max = 128)
}

define_text! {
    #[doc = "Comma-separated features of an [`Estate`]."]
    Features(max = 64)
}

impl Features {
    /// Checks whether these [`Features`] contain the provided `tag` as a
    /// substring.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }
}

/// Monthly rent of an [`Estate`].
pub type Rent = i64;

/// Popularity score of an [`Estate`].
///
/// The higher the score, the earlier the [`Estate`] is listed.
pub type Popularity = i64;

/// Entrance door of an [`Estate`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Door {
    /// Height of this [`Door`].
    pub height: i64,

    /// Width of this [`Door`].
    pub width: i64,
}

impl Door {
    /// Returns the smaller of this [`Door`]'s dimensions.
    #[must_use]
    pub fn narrow(&self) -> i64 {
        self.height.min(self.width)
    }

    /// Returns the larger of this [`Door`]'s dimensions.
    #[must_use]
    pub fn wide(&self) -> i64 {
        self.height.max(self.width)
    }
}
