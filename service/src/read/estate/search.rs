//! [`Estate`] search definitions.
//!
//! A search request selects ranges by their index in the configured
//! [`Condition`] tables and lists feature tags. [`Builder`] turns these into a
//! storage-agnostic [`Predicate`], being a conjunction of [`Fragment`]s.

use common::pagination::{self, Arguments};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use strum::Display as StrumDisplay;

use crate::domain::Estate;
#[cfg(doc)]
use crate::{domain::estate, read::estate::TotalCount};

/// Sentinel bound value meaning "unbounded on this side".
pub const UNBOUNDED: i64 = -1;

/// Range of values selectable in a search.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Range {
    /// ID of this [`Range`].
    pub id: i64,

    /// Inclusive lower bound, or [`UNBOUNDED`].
    pub min: i64,

    /// Exclusive upper bound, or [`UNBOUNDED`].
    pub max: i64,
}

impl Range {
    /// Creates a new [`Range`].
    #[must_use]
    pub const fn new(id: i64, min: i64, max: i64) -> Self {
        Self { id, min, max }
    }
}

/// Ordered [`Range`]s selectable for a single field.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RangeCondition {
    /// Prefix to display before the bounds.
    pub prefix: String,

    /// Suffix to display after the bounds.
    pub suffix: String,

    /// Selectable [`Range`]s.
    pub ranges: Vec<Range>,
}

impl RangeCondition {
    /// Resolves the [`Range`] selected by the provided `id`, being an index in
    /// the [`RangeCondition::ranges`].
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Range> {
        self.ranges.get(id.parse::<usize>().ok()?)
    }
}

/// List of values selectable in a search.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListCondition {
    /// Selectable values.
    pub list: Vec<String>,
}

/// Conditions an [`Estate`] search is made of.
///
/// Multi-word keys are accepted in `camelCase`, `snake_case` and lowercase,
/// as configuration sources may lowercase them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault)]
#[serde(default, rename_all = "camelCase")]
pub struct Condition {
    /// [`RangeCondition`] of [`estate::Door::width`].
    #[default(door_ranges())]
    #[serde(alias = "door_width", alias = "doorwidth")]
    pub door_width: RangeCondition,

    /// [`RangeCondition`] of [`estate::Door::height`].
    #[default(door_ranges())]
    #[serde(alias = "door_height", alias = "doorheight")]
    pub door_height: RangeCondition,

    /// [`RangeCondition`] of [`Estate::rent`].
    #[default(RangeCondition {
        prefix: String::new(),
        suffix: "円".to_owned(),
        ranges: vec![
            Range::new(0, UNBOUNDED, 50_000),
            Range::new(1, 50_000, 100_000),
            Range::new(2, 100_000, 150_000),
            Range::new(3, 150_000, UNBOUNDED),
        ],
    })]
    pub rent: RangeCondition,

    /// [`ListCondition`] of [`Estate::features`].
    #[default(ListCondition {
        list: [
            "最上階",
            "防犯カメラ",
            "ウォークインクローゼット",
            "ワンルーム",
            "ルーフバルコニー付",
            "エアコン付き",
            "駐輪場あり",
            "駐車場あり",
            "オートロック",
            "即入居可",
            "ペット相談可",
            "バス・トイレ別",
        ]
        .map(ToOwned::to_owned)
        .to_vec(),
    })]
    pub feature: ListCondition,
}

impl Condition {
    /// Returns the [`RangeCondition`] of the provided [`Field`].
    #[must_use]
    pub fn range(&self, field: Field) -> &RangeCondition {
        match field {
            Field::DoorHeight => &self.door_height,
            Field::DoorWidth => &self.door_width,
            Field::Rent => &self.rent,
        }
    }
}

/// Default [`RangeCondition`] of door dimensions.
fn door_ranges() -> RangeCondition {
    RangeCondition {
        prefix: String::new(),
        suffix: "cm".to_owned(),
        ranges: vec![
            Range::new(0, UNBOUNDED, 80),
            Range::new(1, 80, 110),
            Range::new(2, 110, 150),
            Range::new(3, 150, UNBOUNDED),
        ],
    }
}

/// Numeric [`Estate`] field filterable by a [`Range`].
///
/// Displays as the name of the storage column.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// [`estate::Door::height`].
    DoorHeight,

    /// [`estate::Door::width`].
    DoorWidth,

    /// [`Estate::rent`].
    Rent,
}

impl Field {
    /// Returns value of this [`Field`] in the provided [`Estate`].
    #[must_use]
    pub fn value(&self, estate: &Estate) -> i64 {
        match self {
            Self::DoorHeight => estate.door.height,
            Self::DoorWidth => estate.door.width,
            Self::Rent => estate.rent,
        }
    }
}

/// Single condition of a [`Predicate`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Fragment {
    /// [`Field`] is greater than or equal to the value.
    AtLeast(Field, i64),

    /// [`Field`] is strictly less than the value.
    LessThan(Field, i64),

    /// [`Estate::features`] contain the tag as a substring.
    HasFeature(String),
}

impl Fragment {
    /// Checks whether the provided [`Estate`] satisfies this [`Fragment`].
    #[must_use]
    pub fn matches(&self, estate: &Estate) -> bool {
        match self {
            Self::AtLeast(field, min) => field.value(estate) >= *min,
            Self::LessThan(field, max) => field.value(estate) < *max,
            Self::HasFeature(tag) => estate.features.contains(tag),
        }
    }
}

/// Non-empty conjunction of [`Fragment`]s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Predicate(Vec<Fragment>);

impl Predicate {
    /// Returns [`Fragment`]s of this [`Predicate`].
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.0
    }

    /// Checks whether the provided [`Estate`] satisfies every [`Fragment`] of
    /// this [`Predicate`].
    #[must_use]
    pub fn matches(&self, estate: &Estate) -> bool {
        self.0.iter().all(|f| f.matches(estate))
    }
}

/// Builder of a [`Predicate`] out of the [`Condition`] selections.
#[derive(Clone, Debug)]
pub struct Builder<'c> {
    /// [`Condition`] to resolve the selected [`Range`]s with.
    condition: &'c Condition,

    /// [`Fragment`]s collected so far.
    fragments: Vec<Fragment>,
}

impl<'c> Builder<'c> {
    /// Creates a new empty [`Builder`].
    #[must_use]
    pub fn new(condition: &'c Condition) -> Self {
        Self {
            condition,
            fragments: Vec::new(),
        }
    }

    /// Adds [`Fragment`]s bounding the provided [`Field`] by the [`Range`]
    /// with the `selected` ID, if any.
    ///
    /// # Errors
    ///
    /// With [`BuildError::InvalidRange`] if the `selected` ID is not a number
    /// or is out of bounds.
    pub fn range(
        mut self,
        field: Field,
        selected: Option<&str>,
    ) -> Result<Self, BuildError> {
        let Some(id) = selected.filter(|id| !id.is_empty()) else {
            return Ok(self);
        };
        let range = self.condition.range(field).get(id).ok_or_else(|| {
            BuildError::InvalidRange {
                field,
                id: id.to_owned(),
            }
        })?;

        if range.min != UNBOUNDED {
            self.fragments.push(Fragment::AtLeast(field, range.min));
        }
        if range.max != UNBOUNDED {
            self.fragments.push(Fragment::LessThan(field, range.max));
        }
        Ok(self)
    }

    /// Adds a [`Fragment::HasFeature`] for each of the comma-separated
    /// `tags`, if any.
    #[must_use]
    pub fn features(mut self, tags: Option<&str>) -> Self {
        if let Some(tags) = tags.filter(|t| !t.is_empty()) {
            self.fragments.extend(
                tags.split(',').map(|t| Fragment::HasFeature(t.to_owned())),
            );
        }
        self
    }

    /// Builds the [`Predicate`] out of the collected [`Fragment`]s.
    ///
    /// # Errors
    ///
    /// With [`BuildError::NoConditions`] if no [`Fragment`]s were collected.
    pub fn build(self) -> Result<Predicate, BuildError> {
        if self.fragments.is_empty() {
            return Err(BuildError::NoConditions);
        }
        Ok(Predicate(self.fragments))
    }
}

/// Error of building a [`Predicate`].
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum BuildError {
    /// Selected [`Range`] doesn't exist.
    #[display("invalid `{field}` range ID: `{id}`")]
    InvalidRange {
        /// [`Field`] the [`Range`] was selected for.
        field: Field,

        /// Selected ID.
        id: String,
    },

    /// No conditions were selected at all.
    #[display("no search conditions provided")]
    NoConditions,
}

/// Raw selections of an [`Estate`] search.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// Selected [`Range`] ID of [`estate::Door::height`].
    pub door_height_range_id: Option<String>,

    /// Selected [`Range`] ID of [`estate::Door::width`].
    pub door_width_range_id: Option<String>,

    /// Selected [`Range`] ID of [`Estate::rent`].
    pub rent_range_id: Option<String>,

    /// Comma-separated [`estate::Features`] tags, all of which are required.
    pub features: Option<String>,
}

impl Filter {
    /// Builds the [`Predicate`] of this [`Filter`] against the provided
    /// [`Condition`].
    ///
    /// # Errors
    ///
    /// See [`Builder`].
    pub fn predicate(
        &self,
        condition: &Condition,
    ) -> Result<Predicate, BuildError> {
        Builder::new(condition)
            .range(Field::DoorHeight, self.door_height_range_id.as_deref())?
            .range(Field::DoorWidth, self.door_width_range_id.as_deref())?
            .range(Field::Rent, self.rent_range_id.as_deref())?
            .features(self.features.as_deref())
            .build()
    }
}

/// Page of an [`Estate`] search, ordered by [`Estate::popularity`]
/// descending, then by [`Estate::id`] ascending.
pub type Page = pagination::Page<Estate>;

/// Selector of a [`Page`].
///
/// The same [`Predicate`] selects the [`TotalCount`].
#[derive(Clone, Debug)]
pub struct Selector {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// [`Predicate`] the [`Estate`]s must satisfy.
    pub predicate: Predicate,
}

/// Comparator ordering [`Estate`]s the way every search lists them.
#[must_use]
pub fn listing_order(a: &Estate, b: &Estate) -> std::cmp::Ordering {
    b.popularity.cmp(&a.popularity).then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod spec {
    use common::Coordinate;

    use crate::domain::estate::{self, Door, Estate};

    use super::{BuildError, Builder, Condition, Field, Filter, Fragment};

    fn estate(rent: i64, height: i64, width: i64, features: &str) -> Estate {
        Estate {
            id: 1_i64.into(),
            name: estate::Name::new("name").unwrap(),
            description: estate::Description::new("").unwrap(),
            thumbnail: estate::Thumbnail::new("").unwrap(),
            address: estate::Address::new("").unwrap(),
            location: Coordinate::new(35.0, 139.0),
            rent,
            door: Door { height, width },
            features: estate::Features::new(features).unwrap(),
            popularity: 0,
        }
    }

    fn condition() -> Condition {
        let mut condition = Condition::default();
        condition.rent.ranges = vec![
            super::Range::new(0, -1, 10),
            super::Range::new(1, 10, 20),
            super::Range::new(2, 20, -1),
        ];
        condition
    }

    #[test]
    fn lower_bound_is_inclusive_upper_is_exclusive() {
        let predicate = Builder::new(&condition())
            .range(Field::Rent, Some("1"))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            predicate.fragments(),
            [
                Fragment::AtLeast(Field::Rent, 10),
                Fragment::LessThan(Field::Rent, 20),
            ],
        );
        assert!(!predicate.matches(&estate(9, 100, 100, "")));
        assert!(predicate.matches(&estate(10, 100, 100, "")));
        assert!(predicate.matches(&estate(19, 100, 100, "")));
        assert!(!predicate.matches(&estate(20, 100, 100, "")));
    }

    #[test]
    fn unbounded_sides_emit_nothing() {
        let condition = condition();

        let lowest = Builder::new(&condition)
            .range(Field::Rent, Some("0"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(lowest.fragments(), [Fragment::LessThan(Field::Rent, 10)]);

        let highest = Builder::new(&condition)
            .range(Field::Rent, Some("2"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(highest.fragments(), [Fragment::AtLeast(Field::Rent, 20)]);
    }

    #[test]
    fn rejects_invalid_range_ids() {
        let condition = condition();

        for id in ["99", "3", "-1", "one", " 1"] {
            assert_eq!(
                Builder::new(&condition)
                    .range(Field::Rent, Some(id))
                    .unwrap_err(),
                BuildError::InvalidRange {
                    field: Field::Rent,
                    id: id.to_owned(),
                },
            );
        }
    }

    #[test]
    fn rejects_empty_predicate() {
        let condition = condition();

        assert_eq!(
            Builder::new(&condition).build().unwrap_err(),
            BuildError::NoConditions,
        );
        assert_eq!(
            Filter {
                rent_range_id: Some(String::new()),
                features: Some(String::new()),
                ..Filter::default()
            }
            .predicate(&condition)
            .unwrap_err(),
            BuildError::NoConditions,
        );
    }

    #[test]
    fn requires_every_feature() {
        let predicate = Builder::new(&condition())
            .features(Some("駐車場あり,オートロック"))
            .build()
            .unwrap();

        assert_eq!(predicate.fragments().len(), 2);
        assert!(predicate.matches(&estate(0, 0, 0, "駐車場あり,オートロック")));
        assert!(!predicate.matches(&estate(0, 0, 0, "駐車場あり")));
        assert!(!predicate.matches(&estate(0, 0, 0, "オートロック")));
    }

    #[test]
    fn combines_every_selection() {
        let predicate = Filter {
            door_height_range_id: Some("1".to_owned()),
            door_width_range_id: Some("3".to_owned()),
            rent_range_id: Some("2".to_owned()),
            features: Some("ロフト".to_owned()),
        }
        .predicate(&condition())
        .unwrap();

        assert_eq!(
            predicate.fragments(),
            [
                Fragment::AtLeast(Field::DoorHeight, 80),
                Fragment::LessThan(Field::DoorHeight, 110),
                Fragment::AtLeast(Field::DoorWidth, 150),
                Fragment::AtLeast(Field::Rent, 20),
                Fragment::HasFeature("ロフト".to_owned()),
            ],
        );
    }

    #[test]
    fn displays_storage_column_names() {
        assert_eq!(Field::DoorHeight.to_string(), "door_height");
        assert_eq!(Field::DoorWidth.to_string(), "door_width");
        assert_eq!(Field::Rent.to_string(), "rent");
    }
}
