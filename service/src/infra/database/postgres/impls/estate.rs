//! [`Estate`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select},
    BoundingBox, Coordinate,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        estate::{self, Door},
        Estate,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::estate::{
        nazotte::{Containment, IsWithin},
        search::{self, Fragment, Predicate},
        LowPriced, Recommended, TotalCount, LIST_LIMIT,
    },
};

/// Columns of the `estates` table an [`Estate`] is built from.
const COLUMNS: &str = "\
    id, name, description, thumbnail, address, latitude, longitude, \
    rent, door_height, door_width, features, popularity";

/// Builds an [`Estate`] out of the provided [`Row`] selected with
/// [`COLUMNS`].
fn from_row(row: &Row) -> Estate {
    Estate {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        thumbnail: row.get("thumbnail"),
        address: row.get("address"),
        location: Coordinate::new(row.get("latitude"), row.get("longitude")),
        rent: row.get("rent"),
        door: Door {
            height: row.get("door_height"),
            width: row.get("door_width"),
        },
        features: row.get("features"),
        popularity: row.get("popularity"),
    }
}

/// Renders the provided [`Predicate`] as an SQL boolean expression, pushing
/// its values into the `params`.
fn filtering<'p>(
    predicate: &'p Predicate,
    params: &mut Vec<&'p (dyn ToSql + Sync)>,
) -> String {
    predicate
        .fragments()
        .iter()
        .map(|fragment| match fragment {
            Fragment::AtLeast(field, min) => {
                params.push(min);
                format!("{field} >= ${}::INT8", params.len())
            }
            Fragment::LessThan(field, max) => {
                params.push(max);
                format!("{field} < ${}::INT8", params.len())
            }
            Fragment::HasFeature(tag) => {
                params.push(tag);
                format!("STRPOS(features, ${}::VARCHAR) > 0", params.len())
            }
        })
        .join(" AND ")
}

/// Renders the query selecting [`Estate`]s within a [`BoundingBox`], bound
/// as `$1..=$4` (`low.latitude`, `high.latitude`, `low.longitude`,
/// `high.longitude`).
fn bounding_box_sql() -> String {
    format!(
        "SELECT {COLUMNS} \
         FROM estates \
         WHERE latitude BETWEEN $1::FLOAT8 AND $2::FLOAT8 \
           AND longitude BETWEEN $3::FLOAT8 AND $4::FLOAT8 \
         ORDER BY popularity DESC, id ASC",
    )
}

/// Query checking whether a point (`$2`, `$3`) lies within a polygon ring
/// (`$1`).
const CONTAINMENT_SQL: &str = "\
    SELECT CAST($1::TEXT AS POLYGON) \
           @> POINT($2::FLOAT8, $3::FLOAT8) AS is_within";

/// Renders the query selecting a [`search::Page`] of [`Estate`]s satisfying
/// the provided [`Predicate`].
///
/// The `params` must already hold the `LIMIT` and `OFFSET` values.
fn page_sql<'p>(
    predicate: &'p Predicate,
    params: &mut Vec<&'p (dyn ToSql + Sync)>,
) -> String {
    format!(
        "SELECT {COLUMNS} \
         FROM estates \
         WHERE {filtering} \
         ORDER BY popularity DESC, id ASC \
         LIMIT $1::INT8 OFFSET $2::INT8",
        filtering = filtering(predicate, params),
    )
}

/// Renders the query counting [`Estate`]s satisfying the provided
/// [`Predicate`].
fn count_sql<'p>(
    predicate: &'p Predicate,
    params: &mut Vec<&'p (dyn ToSql + Sync)>,
) -> String {
    format!(
        "SELECT COUNT(*)::INT8 \
         FROM estates \
         WHERE {filtering}",
        filtering = filtering(predicate, params),
    )
}

impl<C> Database<Select<By<Option<Estate>, estate::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Estate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Estate>, estate::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM estates \
             WHERE id = $1::INT8",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Estate>, BoundingBox>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Estate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Estate>, BoundingBox>>,
    ) -> Result<Self::Ok, Self::Err> {
        let BoundingBox { low, high } = by.into_inner();

        Ok(self
            .query(
                &bounding_box_sql(),
                &[&low.latitude, &high.latitude, &low.longitude, &high.longitude],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<IsWithin, Containment>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = IsWithin;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<IsWithin, Containment>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Containment { polygon, point } = by.into_inner();
        let ring = polygon.ring();

        self.query_opt(
            CONTAINMENT_SQL,
            &[&ring, &point.latitude, &point.longitude],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|row| IsWithin(row.expect("always exists").get("is_within")))
    }
}

impl<C> Database<Select<By<search::Page, search::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = search::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::Page, search::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let search::Selector {
            arguments,
            predicate,
        } = by.into_inner();

        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        let sql = page_sql(&predicate, &mut ps);
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        Ok(search::Page::new(arguments, rows.iter().map(from_row)))
    }
}

impl<C> Database<Select<By<TotalCount, Predicate>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<TotalCount, Predicate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let predicate = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let sql = count_sql(&predicate, &mut ps);
        self.query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i64>(0).into())
    }
}

impl<C> Database<Select<By<Vec<Estate>, LowPriced>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Estate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Estate>, LowPriced>>,
    ) -> Result<Self::Ok, Self::Err> {
        let limit = i64::try_from(LIST_LIMIT).expect("`LIST_LIMIT` overflow");

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM estates \
             ORDER BY rent ASC, id ASC \
             LIMIT $1::INT8",
        );
        Ok(self
            .query(&sql, &[&limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Estate>, Recommended>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Estate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Estate>, Recommended>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Recommended(ranked) = by.into_inner();
        let limit = i64::try_from(LIST_LIMIT).expect("`LIST_LIMIT` overflow");

        // `door_narrow` and `door_wide` are generated columns holding the
        // smaller and the larger side of the door.
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM estates \
             WHERE door_narrow >= $1::INT8 \
               AND door_wide >= $2::INT8 \
             ORDER BY popularity DESC, id ASC \
             LIMIT $3::INT8",
        );
        Ok(self
            .query(&sql, &[&ranked.min, &ranked.mid, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Estate>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(estate): Insert<Estate>,
    ) -> Result<Self::Ok, Self::Err> {
        let Estate {
            id,
            name,
            description,
            thumbnail,
            address,
            location,
            rent,
            door,
            features,
            popularity,
        } = estate;

        const SQL: &str = "\
            INSERT INTO estates (\
                id, name, description, thumbnail, address, \
                latitude, longitude, \
                rent, door_height, door_width, features, popularity\
            ) VALUES (\
                $1::INT8, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::FLOAT8, $7::FLOAT8, \
                $8::INT8, $9::INT8, $10::INT8, $11::VARCHAR, $12::INT8\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &description,
                &thumbnail,
                &address,
                &location.latitude,
                &location.longitude,
                &rent,
                &door.height,
                &door.width,
                &features,
                &popularity,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<Estate>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Delete<By<Vec<Estate>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "DELETE FROM estates";
        self.exec(SQL, &[]).await.map_err(tracerr::wrap!()).map(drop)
    }
}

#[cfg(test)]
mod spec {
    use postgres_types::ToSql;

    use crate::read::estate::search::{Builder, Condition, Field, Predicate};

    use super::{bounding_box_sql, count_sql, page_sql, CONTAINMENT_SQL};

    /// Door width in `[80, 110)`, rent below `50000`, and two feature tags.
    fn mixed(condition: &Condition) -> Predicate {
        Builder::new(condition)
            .range(Field::DoorWidth, Some("1"))
            .unwrap()
            .range(Field::Rent, Some("0"))
            .unwrap()
            .features(Some("a,b"))
            .build()
            .unwrap()
    }

    #[test]
    fn numbers_page_filters_after_pagination() {
        let condition = Condition::default();
        let predicate = mixed(&condition);
        let (limit, offset) = (10_i64, 20_i64);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        let sql = page_sql(&predicate, &mut ps);

        assert!(
            sql.contains(
                "WHERE door_width >= $3::INT8 \
                 AND door_width < $4::INT8 \
                 AND rent < $5::INT8 \
                 AND STRPOS(features, $6::VARCHAR) > 0 \
                 AND STRPOS(features, $7::VARCHAR) > 0 \
                 ORDER BY popularity DESC, id ASC \
                 LIMIT $1::INT8 OFFSET $2::INT8",
            ),
            "{sql}",
        );
        assert_eq!(
            format!("{ps:?}"),
            r#"[10, 20, 80, 110, 50000, "a", "b"]"#,
        );
    }

    #[test]
    fn numbers_count_filters_from_first() {
        let condition = Condition::default();
        let predicate = mixed(&condition);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let sql = count_sql(&predicate, &mut ps);

        assert_eq!(
            sql,
            "SELECT COUNT(*)::INT8 FROM estates \
             WHERE door_width >= $1::INT8 \
             AND door_width < $2::INT8 \
             AND rent < $3::INT8 \
             AND STRPOS(features, $4::VARCHAR) > 0 \
             AND STRPOS(features, $5::VARCHAR) > 0",
        );
        assert_eq!(format!("{ps:?}"), r#"[80, 110, 50000, "a", "b"]"#);
    }

    #[test]
    fn renders_only_bounded_sides() {
        let condition = Condition::default();
        let predicate = Builder::new(&condition)
            .range(Field::DoorHeight, Some("3"))
            .unwrap()
            .build()
            .unwrap();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let sql = count_sql(&predicate, &mut ps);

        assert!(sql.ends_with("WHERE door_height >= $1::INT8"), "{sql}");
        assert_eq!(format!("{ps:?}"), "[150]");
    }

    #[test]
    fn selects_bounding_box_inclusively() {
        let sql = bounding_box_sql();

        assert!(
            sql.contains(
                "WHERE latitude BETWEEN $1::FLOAT8 AND $2::FLOAT8 \
                 AND longitude BETWEEN $3::FLOAT8 AND $4::FLOAT8 \
                 ORDER BY popularity DESC, id ASC",
            ),
            "{sql}",
        );
    }

    #[test]
    fn checks_containment_of_latitude_first_point() {
        assert_eq!(
            CONTAINMENT_SQL,
            "SELECT CAST($1::TEXT AS POLYGON) \
             @> POINT($2::FLOAT8, $3::FLOAT8) AS is_within",
        );
    }
}
