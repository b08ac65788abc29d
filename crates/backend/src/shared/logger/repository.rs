use chrono::Utc;
use contracts::shared::logger::LogEntry;
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, Set};

use crate::shared::data::db::try_get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "system_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub source: String,
    pub category: String,
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LogEntry {
    fn from(m: Model) -> Self {
        LogEntry {
            id: m.id,
            timestamp: m.timestamp,
            source: m.source,
            category: m.category,
            message: m.message,
        }
    }
}

/// Записать событие в фоне. Без инициализированной БД событие
/// остается только в tracing.
pub fn log_event_detached(source: &str, category: &str, message: &str) {
    let Some(db) = try_get_connection() else {
        tracing::debug!("system_log unavailable, dropping event [{}] {}", category, message);
        return;
    };
    let source = source.to_string();
    let category = category.to_string();
    let message = message.to_string();

    tokio::spawn(async move {
        if let Err(e) = log_event(db, &source, &category, &message).await {
            tracing::warn!("Failed to write system_log event: {}", e);
        }
    });
}

pub async fn log_event<C: ConnectionTrait>(
    db: &C,
    source: &str,
    category: &str,
    message: &str,
) -> anyhow::Result<i64> {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();

    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(now),
        source: Set(source.to_string()),
        category: Set(category.to_string()),
        message: Set(message.to_string()),
    };

    let model = active.insert(db).await?;
    Ok(model.id)
}

/// Все записи, новые сверху
pub async fn get_all_logs<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<LogEntry>> {
    let logs: Vec<LogEntry> = Entity::find()
        .order_by_desc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(logs)
}

pub async fn clear_all_logs<C: ConnectionTrait>(db: &C) -> anyhow::Result<u64> {
    let result = Entity::delete_many().exec(db).await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    #[tokio::test]
    async fn test_log_roundtrip_newest_first() {
        let db = connect_in_memory().await;
        log_event(&db, "server", "startup", "first").await.unwrap();
        log_event(&db, "client", "ui", "second").await.unwrap();

        let logs = get_all_logs(&db).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "second");
        assert_eq!(logs[1].source, "server");

        assert_eq!(clear_all_logs(&db).await.unwrap(), 2);
        assert!(get_all_logs(&db).await.unwrap().is_empty());
    }
}
