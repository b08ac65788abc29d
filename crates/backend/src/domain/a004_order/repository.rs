use contracts::domain::a004_order::Order;
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer_name: Option<String>,
    pub total: f64,
    pub status: String,
    pub created_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(m: Model) -> Self {
        Order {
            id: m.id,
            customer_name: m.customer_name,
            total: m.total,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

/// Все заказы, новые сверху
pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Order>> {
    let items = Entity::find()
        .order_by_desc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}
