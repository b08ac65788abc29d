use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: Option<String>,
    pub total: f64,
    pub status: String,
    pub created_at: Option<String>,
}
