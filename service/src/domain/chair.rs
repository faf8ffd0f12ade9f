//! [`Chair`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use super::{define_text, estate};

/// Chair sold along with the estates.
#[derive(Clone, Debug, PartialEq)]
pub struct Chair {
    /// ID of this [`Chair`].
    pub id: Id,

    /// [`Name`] of this [`Chair`].
    pub name: Name,

    /// [`Description`] of this [`Chair`].
    pub description: Description,

    /// [`Thumbnail`] of this [`Chair`].
    pub thumbnail: Thumbnail,

    /// [`Price`] of this [`Chair`].
    pub price: Price,

    /// [`Dimensions`] of this [`Chair`].
    pub dimensions: Dimensions,

    /// [`Color`] of this [`Chair`].
    pub color: Color,

    /// [`Features`] of this [`Chair`].
    pub features: Features,

    /// [`Kind`] of this [`Chair`].
    pub kind: Kind,

    /// Popularity score of this [`Chair`].
    pub popularity: i64,

    /// Number of this [`Chair`]s in stock.
    pub stock: i64,
}

/// ID of a [`Chair`].
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
    #[doc = "Name of a [`Chair`]."]
    Name(max = 64)
}

define_text! {
    #[doc = "Description of a [`Chair`]."]
    Description(max = 4096)
}

define_text! {
    #[doc = "Thumbnail image path of a [`Chair`]."]
    Thumbnail(max = 128)
}

define_text! {
    #[doc = "Color of a [`Chair`]."]
    Color(max = 64)
}

define_text! {
    #[doc = "Comma-separated features of a [`Chair`]."]
    Features(max = 64)
}

define_text! {
    #[doc = "Kind of a [`Chair`]."]
    Kind(max = 64)
}

/// Price of a [`Chair`].
pub type Price = i64;

/// Size of a [`Chair`] along one of its axes.
pub type Size = i64;

/// Bounding dimensions of a [`Chair`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Dimensions {
    /// Width of a [`Chair`].
    pub width: Size,

    /// Height of a [`Chair`].
    pub height: Size,

    /// Depth of a [`Chair`].
    pub depth: Size,
}

impl Dimensions {
    /// Orders these [`Dimensions`] from the smallest to the largest.
    #[must_use]
    pub fn rank(&self) -> Ranked {
        let Self {
            width,
            height,
            depth,
        } = *self;

        let min = width.min(height).min(depth);
        let max = width.max(height).max(depth);
        // Exact modulo 2^64, and the result is always one of the inputs.
        let mid = width
            .wrapping_add(height)
            .wrapping_add(depth)
            .wrapping_sub(min)
            .wrapping_sub(max);

        Ranked { min, mid, max }
    }
}

/// [`Dimensions`] ordered by their size.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Ranked {
    /// Smallest dimension.
    pub min: Size,

    /// Middle dimension.
    pub mid: Size,

    /// Largest dimension.
    pub max: Size,
}

impl Ranked {
    /// Checks whether a [`Chair`] of these [`Ranked`] dimensions can be
    /// carried through the provided [`estate::Door`].
    ///
    /// The largest dimension always goes along the passage, so only the two
    /// smaller ones have to fit into the opening.
    #[must_use]
    pub fn fits(&self, door: estate::Door) -> bool {
        door.narrow() >= self.min && door.wide() >= self.mid
    }
}
