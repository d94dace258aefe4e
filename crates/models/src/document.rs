use chrono::Utc;
use sea_orm::{entity::prelude::*, sea_query::Expr, DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// One stored record of any collection; the record fields live in `body`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub collection: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub body: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn db_err(e: DbErr) -> ModelError {
    ModelError::Db(e.to_string())
}

pub async fn insert(db: &DatabaseConnection, collection: &str, body: Json) -> Result<Model, ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        collection: Set(collection.to_string()),
        body: Set(body),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(db_err)
}

/// All documents of a collection, oldest first.
pub async fn list(db: &DatabaseConnection, collection: &str) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .filter(Column::Collection.eq(collection))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(db_err)
}

pub async fn find(db: &DatabaseConnection, collection: &str, id: &str) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id.to_string())
        .filter(Column::Collection.eq(collection))
        .one(db)
        .await
        .map_err(db_err)
}

/// Overwrite the body of an existing document in one statement.
/// Returns `false` when no document matched.
pub async fn replace(db: &DatabaseConnection, collection: &str, id: &str, body: Json) -> Result<bool, ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::Body, Expr::value(body))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::Collection.eq(collection))
        .exec(db)
        .await
        .map_err(db_err)?;
    Ok(res.rows_affected > 0)
}

pub async fn delete(db: &DatabaseConnection, collection: &str, id: &str) -> Result<bool, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::Collection.eq(collection))
        .exec(db)
        .await
        .map_err(db_err)?;
    Ok(res.rows_affected > 0)
}
