//! [`Chair`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{
        chair::{self, Dimensions},
        Chair,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Chair>, chair::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Chair>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Chair>, chair::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, description, thumbnail, price, \
                   height, width, depth, \
                   color, features, kind, popularity, stock \
            FROM chairs \
            WHERE id = $1::INT8";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Chair {
                id: row.get("id"),
                name: row.get("name"),
                description: row.get("description"),
                thumbnail: row.get("thumbnail"),
                price: row.get("price"),
                dimensions: Dimensions {
                    width: row.get("width"),
                    height: row.get("height"),
                    depth: row.get("depth"),
                },
                color: row.get("color"),
                features: row.get("features"),
                kind: row.get("kind"),
                popularity: row.get("popularity"),
                stock: row.get("stock"),
            }))
    }
}

impl<C> Database<Insert<Chair>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(chair): Insert<Chair>,
    ) -> Result<Self::Ok, Self::Err> {
        let Chair {
            id,
            name,
            description,
            thumbnail,
            price,
            dimensions,
            color,
            features,
            kind,
            popularity,
            stock,
        } = chair;

        const SQL: &str = "\
            INSERT INTO chairs (\
                id, name, description, thumbnail, price, \
                height, width, depth, \
                color, features, kind, popularity, stock\
            ) VALUES (\
                $1::INT8, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::INT8, \
                $6::INT8, $7::INT8, $8::INT8, \
                $9::VARCHAR, $10::VARCHAR, $11::VARCHAR, $12::INT8, $13::INT8\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &description,
                &thumbnail,
                &price,
                &dimensions.height,
                &dimensions.width,
                &dimensions.depth,
                &color,
                &features,
                &kind,
                &popularity,
                &stock,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<Chair>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Delete<By<Vec<Chair>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "DELETE FROM chairs";
        self.exec(SQL, &[]).await.map_err(tracerr::wrap!()).map(drop)
    }
}
