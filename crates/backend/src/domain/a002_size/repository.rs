use contracts::domain::a002_size::Size;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Size {
    fn from(m: Model) -> Self {
        Size {
            id: m.id,
            name: m.name,
            category_id: m.category_id,
        }
    }
}

/// Размеры категории в порядке создания
pub async fn list_by_category<C: ConnectionTrait>(
    db: &C,
    category_id: i64,
) -> anyhow::Result<Vec<Size>> {
    let items = Entity::find()
        .filter(Column::CategoryId.eq(category_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn find<C: ConnectionTrait>(
    db: &C,
    name: &str,
    category_id: i64,
) -> anyhow::Result<Option<Size>> {
    let result = Entity::find()
        .filter(Column::Name.eq(name))
        .filter(Column::CategoryId.eq(category_id))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    name: &str,
    category_id: i64,
) -> anyhow::Result<i64> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        name: Set(name.to_string()),
        category_id: Set(category_id),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_category;
    use crate::shared::data::db::connect_in_memory;

    #[tokio::test]
    async fn test_same_name_in_two_categories_is_two_rows() {
        let db = connect_in_memory().await;
        let tops = a001_category::repository::insert(&db, "Tops").await.unwrap();
        let shoes = a001_category::repository::insert(&db, "Shoes").await.unwrap();

        let s1 = insert(&db, "M", tops).await.unwrap();
        let s2 = insert(&db, "M", shoes).await.unwrap();
        assert_ne!(s1, s2);

        assert_eq!(find(&db, "M", tops).await.unwrap().unwrap().id, s1);
        assert_eq!(find(&db, "M", shoes).await.unwrap().unwrap().id, s2);
        assert_eq!(list_by_category(&db, tops).await.unwrap().len(), 1);
        assert!(insert(&db, "M", tops).await.is_err());
    }
}
