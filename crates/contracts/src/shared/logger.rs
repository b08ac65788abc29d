use serde::{Deserialize, Serialize};

pub const SOURCE_SERVER: &str = "server";
pub const SOURCE_CLIENT: &str = "client";

/// Запись журнала событий (таблица system_log)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: String,
    pub source: String,
    pub category: String,
    pub message: String,
}

/// Тело POST /api/logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLogRequest {
    #[serde(default = "default_source")]
    pub source: String,
    pub category: String,
    pub message: String,
}

fn default_source() -> String {
    SOURCE_CLIENT.to_string()
}

impl CreateLogRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("category must not be empty".into());
        }
        if self.message.trim().is_empty() {
            return Err("message must not be empty".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_defaults_to_client() {
        let req: CreateLogRequest =
            serde_json::from_str(r#"{"category": "ui", "message": "opened import"}"#).unwrap();
        assert_eq!(req.source, SOURCE_CLIENT);
        assert!(req.validate().is_ok());
    }
}
