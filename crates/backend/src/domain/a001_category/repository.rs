use contracts::domain::a001_category::Category;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(m: Model) -> Self {
        Category {
            id: m.id,
            name: m.name,
        }
    }
}

pub async fn list_all<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<Category>> {
    let items = Entity::find()
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Найти категорию по точному имени
pub async fn find_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> anyhow::Result<Option<Category>> {
    let result = Entity::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, name: &str) -> anyhow::Result<i64> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        name: Set(name.to_string()),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    #[tokio::test]
    async fn test_insert_and_find_by_name() {
        let db = connect_in_memory().await;
        let id = insert(&db, "Tops").await.unwrap();

        let found = find_by_name(&db, "Tops").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(find_by_name(&db, "tops").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected_by_store() {
        let db = connect_in_memory().await;
        insert(&db, "Tops").await.unwrap();
        assert!(insert(&db, "Tops").await.is_err());
        assert_eq!(list_all(&db).await.unwrap().len(), 1);
    }
}
