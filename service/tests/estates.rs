//! [`Query`] tests against an in-memory [`Database`].

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use common::{
    operations::{By, Select},
    BoundingBox, Coordinate,
};
use service::{
    command::{
        request_estate_document::{self, Email},
        RequestEstateDocument,
    },
    domain::{
        chair::{self, Chair, Dimensions},
        estate::{self, Door, Estate},
    },
    infra::{
        database,
        postgres::{self, connection::PoolError},
        Database,
    },
    query::{
        recommend_estates, search_estates, search_estates_in_polygon,
        RecommendEstates, SearchEstates, SearchEstatesInPolygon,
    },
    read::estate::{
        nazotte::{Containment, IsWithin},
        search::{self, listing_order, BuildError, Filter, Predicate},
        Recommended, TotalCount, LIST_LIMIT,
    },
    Config, Query, Service,
};
use tracerr::Traced;

/// In-memory [`Database`] holding a fixed data set.
#[derive(Clone, Debug, Default)]
struct Memory {
    estates: Arc<Vec<Estate>>,
    chairs: Arc<Vec<Chair>>,

    /// Location failing every containment check against it.
    broken_location: Option<Coordinate>,

    /// Number of containment checks performed so far.
    checks: Arc<AtomicUsize>,
}

impl Memory {
    fn with_estates(estates: impl IntoIterator<Item = Estate>) -> Self {
        Self {
            estates: Arc::new(estates.into_iter().collect()),
            ..Self::default()
        }
    }

    fn sorted(&self, filter: impl Fn(&Estate) -> bool) -> Vec<Estate> {
        let mut estates = self
            .estates
            .iter()
            .filter(|e| filter(e))
            .cloned()
            .collect::<Vec<_>>();
        estates.sort_by(listing_order);
        estates
    }
}

fn failure() -> Traced<database::Error> {
    tracerr::new!(database::Error::from(postgres::Error::from(
        PoolError::Closed
    )))
}

impl Database<Select<By<Vec<Estate>, BoundingBox>>> for Memory {
    type Ok = Vec<Estate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Estate>, BoundingBox>>,
    ) -> Result<Self::Ok, Self::Err> {
        let bbox = by.into_inner();
        Ok(self.sorted(|e| bbox.contains(e.location)))
    }
}

impl Database<Select<By<IsWithin, Containment>>> for Memory {
    type Ok = IsWithin;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<IsWithin, Containment>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Containment { polygon, point } = by.into_inner();

        // Shuffle completion order of concurrent checks.
        let n = self.checks.fetch_add(1, Ordering::SeqCst);
        for _ in 0..(7 - n % 7) {
            tokio::task::yield_now().await;
        }

        if self.broken_location == Some(point) {
            return Err(failure());
        }
        Ok(IsWithin(polygon.contains(point)))
    }
}

impl Database<Select<By<search::Page, search::Selector>>> for Memory {
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
        Ok(search::Page::new(
            arguments,
            self.sorted(|e| predicate.matches(e))
                .into_iter()
                .skip(arguments.offset())
                .take(arguments.limit()),
        ))
    }
}

impl Database<Select<By<TotalCount, Predicate>>> for Memory {
    type Ok = TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<TotalCount, Predicate>>,
    ) -> Result<Self::Ok, Self::Err> {
        let predicate = by.into_inner();
        Ok(TotalCount::of(&self.sorted(|e| predicate.matches(e))))
    }
}

impl Database<Select<By<Option<Chair>, chair::Id>>> for Memory {
    type Ok = Option<Chair>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Chair>, chair::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.chairs.iter().find(|c| c.id == id).cloned())
    }
}

impl Database<Select<By<Option<Estate>, estate::Id>>> for Memory {
    type Ok = Option<Estate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Estate>, estate::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.estates.iter().find(|e| e.id == id).cloned())
    }
}

impl Database<Select<By<Vec<Estate>, Recommended>>> for Memory {
    type Ok = Vec<Estate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Estate>, Recommended>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Recommended(ranked) = by.into_inner();
        let mut estates = self.sorted(|e| ranked.fits(e.door));
        estates.truncate(LIST_LIMIT);
        Ok(estates)
    }
}

fn estate(id: i64, latitude: f64, longitude: f64, popularity: i64) -> Estate {
    Estate {
        id: id.into(),
        name: estate::Name::new(format!("estate {id}")).unwrap(),
        description: estate::Description::new("").unwrap(),
        thumbnail: estate::Thumbnail::new("/images/estate.png").unwrap(),
        address: estate::Address::new("").unwrap(),
        location: Coordinate::new(latitude, longitude),
        rent: 50_000 + id * 1_000,
        door: Door {
            height: 100 + id,
            width: 100 + id,
        },
        features: estate::Features::new("").unwrap(),
        popularity,
    }
}

fn chair(id: i64, width: i64, height: i64, depth: i64) -> Chair {
    Chair {
        id: id.into(),
        name: chair::Name::new("chair").unwrap(),
        description: chair::Description::new("").unwrap(),
        thumbnail: chair::Thumbnail::new("").unwrap(),
        price: 1_000,
        dimensions: Dimensions {
            width,
            height,
            depth,
        },
        color: chair::Color::new("黒").unwrap(),
        features: chair::Features::new("").unwrap(),
        kind: chair::Kind::new("ゲーミングチェア").unwrap(),
        popularity: 0,
        stock: 1,
    }
}

fn square() -> Vec<Coordinate> {
    vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 10.0),
        Coordinate::new(10.0, 10.0),
        Coordinate::new(10.0, 0.0),
    ]
}

fn ids(estates: &[Estate]) -> Vec<i64> {
    estates.iter().map(|e| e.id.into()).collect()
}

mod polygon_search {
    use super::*;

    #[tokio::test]
    async fn finds_estates_inside_polygon() {
        let svc = Service::new(
            Config::default(),
            Memory::with_estates([
                estate(1, 5.0, 5.0, 10),
                estate(2, 15.0, 5.0, 20),
                estate(3, 10.0, 5.0, 5),
            ]),
        );

        let found = svc
            .execute(SearchEstatesInPolygon {
                coordinates: square(),
            })
            .await
            .unwrap();

        assert_eq!(ids(&found.estates), [1, 3]);
        assert_eq!(i64::from(found.count), 2);
    }

    #[tokio::test]
    async fn drops_candidates_outside_concave_polygon() {
        let db = Memory::with_estates([
            estate(1, 1.0, 5.0, 30),
            estate(2, 5.0, 5.0, 20),
            estate(3, 9.0, 5.0, 10),
        ]);
        let checks = Arc::clone(&db.checks);
        let svc = Service::new(Config::default(), db);

        // U-shape opened towards the high longitudes.
        let found = svc
            .execute(SearchEstatesInPolygon {
                coordinates: vec![
                    Coordinate::new(0.0, 0.0),
                    Coordinate::new(10.0, 0.0),
                    Coordinate::new(10.0, 10.0),
                    Coordinate::new(8.0, 10.0),
                    Coordinate::new(8.0, 2.0),
                    Coordinate::new(2.0, 2.0),
                    Coordinate::new(2.0, 10.0),
                    Coordinate::new(0.0, 10.0),
                ],
            })
            .await
            .unwrap();

        assert_eq!(ids(&found.estates), [1, 3]);
        assert_eq!(i64::from(found.count), 2);
        assert_eq!(checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn truncates_and_counts_returned_estates() {
        let svc = Service::new(
            Config::default(),
            Memory::with_estates(
                (1..=60).map(|id| estate(id, 5.0, 5.0, 100 - id)),
            ),
        );

        let found = svc
            .execute(SearchEstatesInPolygon {
                coordinates: square(),
            })
            .await
            .unwrap();

        assert_eq!(found.estates.len(), 50);
        assert_eq!(i64::from(found.count), 50);
        assert_eq!(ids(&found.estates), (1..=50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn keeps_popularity_order_regardless_of_completion() {
        let svc = Service::new(
            Config::default(),
            Memory::with_estates(
                (1..=30).map(|id| estate(id, 5.0, 5.0, id % 4)),
            ),
        );

        let found = svc
            .execute(SearchEstatesInPolygon {
                coordinates: square(),
            })
            .await
            .unwrap();

        let mut expected = found.estates.clone();
        expected.sort_by(listing_order);
        assert_eq!(found.estates, expected);
        assert_eq!(found.estates.len(), 30);
    }

    #[tokio::test]
    async fn succeeds_without_candidates() {
        let svc = Service::new(
            Config::default(),
            Memory::with_estates([estate(1, 50.0, 50.0, 1)]),
        );

        let found = svc
            .execute(SearchEstatesInPolygon {
                coordinates: square(),
            })
            .await
            .unwrap();

        assert!(found.estates.is_empty());
        assert_eq!(i64::from(found.count), 0);
    }

    #[tokio::test]
    async fn runs_on_spawned_task() {
        let svc = Service::new(
            Config::default(),
            Memory::with_estates([
                estate(1, 5.0, 5.0, 10),
                estate(2, 15.0, 5.0, 20),
            ]),
        );

        let found = tokio::spawn(async move {
            svc.execute(SearchEstatesInPolygon {
                coordinates: square(),
            })
            .await
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(ids(&found.estates), [1]);
    }

    #[tokio::test]
    async fn rejects_empty_polygon() {
        let svc = Service::new(Config::default(), Memory::default());

        let err = svc
            .execute(SearchEstatesInPolygon {
                coordinates: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            search_estates_in_polygon::ExecutionError::EmptyPolygon,
        ));
    }

    #[tokio::test]
    async fn aborts_on_failed_check() {
        let mut db = Memory::with_estates((1..=10_i32).map(|n| {
            estate(n.into(), 1.0, f64::from(n) / 2.0, n.into())
        }));
        db.broken_location = Some(Coordinate::new(1.0, 3.0));
        let svc = Service::new(Config::default(), db);

        let err = svc
            .execute(SearchEstatesInPolygon {
                coordinates: square(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            search_estates_in_polygon::ExecutionError::Db(_),
        ));
    }
}

mod range_search {
    use super::*;

    fn filter(rent_range_id: &str) -> Filter {
        Filter {
            rent_range_id: Some(rent_range_id.to_owned()),
            ..Filter::default()
        }
    }

    fn svc() -> Service<Memory> {
        // Rents are `51_000..=90_000`, so the `50_000..100_000` range selects
        // every `Estate` below `id = 50`.
        Service::new(
            Config::default(),
            Memory::with_estates(
                (1..=40).map(|id| estate(id, 0.0, 0.0, id % 5)),
            ),
        )
    }

    #[tokio::test]
    async fn counts_whole_filtered_set() {
        let found = svc()
            .execute(SearchEstates {
                filter: filter("1"),
                page: 0,
                per_page: 7,
            })
            .await
            .unwrap();

        assert_eq!(i64::from(found.count), 40);
        assert_eq!(found.estates.len(), 7);
    }

    #[tokio::test]
    async fn concatenated_pages_reproduce_sorted_set() {
        let svc = svc();

        let mut listed = vec![];
        for page in 0..6 {
            let found = svc
                .execute(SearchEstates {
                    filter: filter("1"),
                    page,
                    per_page: 7,
                })
                .await
                .unwrap();
            listed.extend(found.estates);
        }

        let mut expected = (1..=40)
            .map(|id| estate(id, 0.0, 0.0, id % 5))
            .collect::<Vec<_>>();
        expected.sort_by(listing_order);
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn pages_are_stable() {
        let svc = svc();
        let query = SearchEstates {
            filter: filter("1"),
            page: 2,
            per_page: 5,
        };

        let first = svc.execute(query.clone()).await.unwrap();
        let second = svc.execute(query).await.unwrap();

        assert_eq!(first.estates, second.estates);
    }

    #[tokio::test]
    async fn succeeds_with_empty_result() {
        let found = svc()
            .execute(SearchEstates {
                filter: filter("3"),
                page: 0,
                per_page: 10,
            })
            .await
            .unwrap();

        assert!(found.estates.is_empty());
        assert_eq!(i64::from(found.count), 0);
    }

    #[tokio::test]
    async fn rejects_out_of_range_id() {
        let err = svc()
            .execute(SearchEstates {
                filter: filter("99"),
                page: 0,
                per_page: 10,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            search_estates::ExecutionError::InvalidCondition(
                BuildError::InvalidRange { .. }
            ),
        ));
    }

    #[tokio::test]
    async fn rejects_missing_conditions() {
        let err = svc()
            .execute(SearchEstates {
                filter: Filter::default(),
                page: 0,
                per_page: 10,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            search_estates::ExecutionError::InvalidCondition(
                BuildError::NoConditions
            ),
        ));
    }

    #[tokio::test]
    async fn rejects_invalid_pagination() {
        for (page, per_page) in [(-1, 10), (0, 0), (0, -3)] {
            let err = svc()
                .execute(SearchEstates {
                    filter: filter("1"),
                    page,
                    per_page,
                })
                .await
                .unwrap_err();

            assert!(matches!(
                err.as_ref(),
                search_estates::ExecutionError::InvalidPagination { .. },
            ));
        }
    }
}

mod recommendation {
    use super::*;

    #[tokio::test]
    async fn fails_on_unknown_chair() {
        let svc = Service::new(Config::default(), Memory::default());

        let err = svc
            .execute(RecommendEstates {
                chair_id: 42_i64.into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            recommend_estates::ExecutionError::ChairNotExists(id)
                if i64::from(*id) == 42,
        ));
    }

    #[tokio::test]
    async fn recommends_most_popular_fitting_estates() {
        let mut db = Memory::with_estates(
            // Doors are `101..=140` wide.
            (1..=40).map(|id| estate(id, 0.0, 0.0, id)),
        );
        db.chairs = Arc::new(vec![chair(1, 300, 105, 110)]);
        let svc = Service::new(Config::default(), db);

        let estates = svc
            .execute(RecommendEstates {
                chair_id: 1_i64.into(),
            })
            .await
            .unwrap();

        assert_eq!(estates.len(), LIST_LIMIT);
        assert_eq!(ids(&estates), (21..=40).rev().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn recommends_nothing_for_huge_chair() {
        let mut db =
            Memory::with_estates((1..=5).map(|id| estate(id, 0.0, 0.0, id)));
        db.chairs = Arc::new(vec![chair(1, 500, 500, 500)]);
        let svc = Service::new(Config::default(), db);

        let estates = svc
            .execute(RecommendEstates {
                chair_id: 1_i64.into(),
            })
            .await
            .unwrap();

        assert!(estates.is_empty());
    }
}

mod document_request {
    use super::*;

    #[tokio::test]
    async fn accepts_any_email_string() {
        let svc = Service::new(
            Config::default(),
            Memory::with_estates([estate(1, 0.0, 0.0, 1)]),
        );

        for email in ["isuumo@example.com", "isuumo", ""] {
            svc.execute(RequestEstateDocument {
                estate_id: 1_i64.into(),
                email: Email::from(email.to_owned()),
            })
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn fails_on_unknown_estate() {
        let svc = Service::new(
            Config::default(),
            Memory::with_estates([estate(1, 0.0, 0.0, 1)]),
        );

        let err = svc
            .execute(RequestEstateDocument {
                estate_id: 2_i64.into(),
                email: Email::from("isuumo".to_owned()),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            request_estate_document::ExecutionError::EstateNotExists(id)
                if i64::from(*id) == 2,
        ));
    }
}
