use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseBackend, Set, Statement};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub variant_id: i64,
    pub size_id: i64,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    variant_id: i64,
    size_id: i64,
    quantity: i32,
) -> anyhow::Result<i64> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        variant_id: Set(variant_id),
        size_id: Set(size_id),
        quantity: Set(quantity),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

/// Записать остаток варианта по размеру (вставка или замена количества)
pub async fn upsert<C: ConnectionTrait>(
    db: &C,
    variant_id: i64,
    size_id: i64,
    quantity: i32,
) -> anyhow::Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
        INSERT INTO stock (variant_id, size_id, quantity) VALUES (?, ?, ?)
        ON CONFLICT(variant_id, size_id) DO UPDATE SET quantity = excluded.quantity
        "#,
        vec![variant_id.into(), size_id.into(), quantity.into()],
    ))
    .await?;
    Ok(())
}
