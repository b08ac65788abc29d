use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseBackend, QueryOrder, QuerySelect, Set, Statement};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_id: i64,
    pub color_hex: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    product_id: i64,
    color_hex: &str,
) -> anyhow::Result<i64> {
    let now = Utc::now().to_rfc3339();
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        product_id: Set(product_id),
        color_hex: Set(color_hex.to_string()),
        created_at: Set(Some(now.clone())),
        updated_at: Set(Some(now)),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

/// Сменить цвет варианта, если он принадлежит товару
pub async fn update_color<C: ConnectionTrait>(
    db: &C,
    id: i64,
    product_id: i64,
    color_hex: &str,
) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::ColorHex, Expr::value(color_hex.to_string()))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().to_rfc3339()))
        .filter(Column::Id.eq(id))
        .filter(Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn list_ids_by_product<C: ConnectionTrait>(
    db: &C,
    product_id: i64,
) -> anyhow::Result<Vec<i64>> {
    let ids = Entity::find()
        .select_only()
        .column(Column::Id)
        .filter(Column::ProductId.eq(product_id))
        .order_by_asc(Column::Id)
        .into_tuple::<i64>()
        .all(db)
        .await?;
    Ok(ids)
}

/// Удалить вариант с его изображениями и остатками
pub async fn delete_with_children<C: ConnectionTrait>(db: &C, id: i64) -> anyhow::Result<()> {
    for sql in [
        "DELETE FROM images WHERE variant_id = ?",
        "DELETE FROM stock WHERE variant_id = ?",
    ] {
        db.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            sql,
            vec![id.into()],
        ))
        .await?;
    }
    Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}
