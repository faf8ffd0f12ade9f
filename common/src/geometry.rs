//! Planar geometry over geographic coordinates.
//!
//! Latitude is treated as the `x` axis and longitude as the `y` axis, both in
//! computations and in the serialized [`Ring`] form.

use std::fmt::{self, Write as _};

use derive_more::{AsRef, Display};
use geo::Intersects as _;
#[cfg(feature = "postgres")]
use postgres_types::ToSql;

/// Geographic coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Coordinate {
    /// Latitude of this [`Coordinate`].
    pub latitude: f64,

    /// Longitude of this [`Coordinate`].
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new [`Coordinate`].
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        Self {
            x: c.latitude,
            y: c.longitude,
        }
    }
}

/// Polygon drawn as an ordered sequence of vertices.
///
/// The ring is always considered closed: the last vertex connects back to the
/// first one, whether or not the first vertex is repeated at the end.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon(Vec<Coordinate>);

impl Polygon {
    /// Creates a new [`Polygon`] out of the provided `vertices`.
    ///
    /// [`None`] is returned if no vertices are provided.
    #[must_use]
    pub fn new(vertices: impl IntoIterator<Item = Coordinate>) -> Option<Self> {
        let vertices = vertices.into_iter().collect::<Vec<_>>();
        (!vertices.is_empty()).then_some(Self(vertices))
    }

    /// Returns vertices of this [`Polygon`] in their original order.
    #[must_use]
    pub fn vertices(&self) -> &[Coordinate] {
        &self.0
    }

    /// Returns the first vertex of this [`Polygon`].
    #[expect(clippy::missing_panics_doc, reason = "non-empty by construction")]
    #[must_use]
    pub fn first(&self) -> Coordinate {
        *self.0.first().expect("non-empty by construction")
    }

    /// Computes the [`BoundingBox`] of this [`Polygon`].
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::of(self)
    }

    /// Checks whether the provided `point` lies inside this [`Polygon`].
    ///
    /// Points on the boundary (edges and vertices) are considered inside.
    /// A single-vertex [`Polygon`] contains only that vertex, and a
    /// two-vertex one contains only the points of its segment.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        let point = geo::Coord::from(point);
        match self.0.as_slice() {
            [] => false,
            [vertex] => geo::Coord::from(*vertex) == point,
            [start, end] => geo::Line::new(*start, *end).intersects(&point),
            vertices => geo::Polygon::new(
                vertices.iter().copied().map(geo::Coord::from).collect(),
                vec![],
            )
            .intersects(&point),
        }
    }

    /// Serializes this [`Polygon`] into its closed [`Ring`] form.
    #[must_use]
    pub fn ring(&self) -> Ring {
        let first = self.first();
        let is_closed = self.0.len() == 1 || self.0.last() == Some(&first);

        let mut ring = String::with_capacity(self.0.len() * 24 + 4);
        ring.push('(');
        for (n, c) in self
            .0
            .iter()
            .chain((!is_closed).then_some(&first))
            .enumerate()
        {
            if n > 0 {
                ring.push(',');
            }
            _ = write!(ring, "({},{})", c.latitude, c.longitude);
        }
        ring.push(')');
        Ring(ring)
    }
}

/// Closed ring of a [`Polygon`] in `((lat,lon),(lat,lon),...)` form, as
/// understood by the `POLYGON` type of PostgreSQL.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Ring(String);

/// Axis-aligned box bounding a [`Polygon`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Corner with the minimal latitude and longitude.
    pub low: Coordinate,

    /// Corner with the maximal latitude and longitude.
    pub high: Coordinate,
}

impl BoundingBox {
    /// Computes the minimal [`BoundingBox`] containing every vertex of the
    /// provided [`Polygon`].
    #[must_use]
    pub fn of(polygon: &Polygon) -> Self {
        let first = polygon.first();
        polygon.vertices()[1..].iter().fold(
            Self {
                low: first,
                high: first,
            },
            |bbox, c| Self {
                low: Coordinate {
                    latitude: bbox.low.latitude.min(c.latitude),
                    longitude: bbox.low.longitude.min(c.longitude),
                },
                high: Coordinate {
                    latitude: bbox.high.latitude.max(c.latitude),
                    longitude: bbox.high.longitude.max(c.longitude),
                },
            },
        )
    }

    /// Checks whether the provided `point` lies inside this [`BoundingBox`],
    /// its sides included.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.low.latitude..=self.high.latitude).contains(&point.latitude)
            && (self.low.longitude..=self.high.longitude)
                .contains(&point.longitude)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}]..[{},{}]",
            self.low.latitude,
            self.low.longitude,
            self.high.latitude,
            self.high.longitude,
        )
    }
}
