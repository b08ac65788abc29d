use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub variant_id: i64,
    pub url: String,
    pub order_index: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    variant_id: i64,
    url: &str,
    order_index: i32,
) -> anyhow::Result<i64> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        variant_id: Set(variant_id),
        url: Set(url.to_string()),
        order_index: Set(order_index),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

/// Обновить изображение варианта. false - изображение не найдено
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: i64,
    variant_id: i64,
    url: &str,
    order_index: i32,
) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::Url, Expr::value(url.to_string()))
        .col_expr(Column::OrderIndex, Expr::value(order_index))
        .filter(Column::Id.eq(id))
        .filter(Column::VariantId.eq(variant_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
