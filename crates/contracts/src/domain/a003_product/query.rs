use serde::{Deserialize, Serialize};

use super::aggregate::Product;

/// Параметры постраничного списка (GET /api/products?limit&page)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductListQuery {
    pub limit: Option<u64>,
    pub page: Option<u64>,
}

impl ProductListQuery {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 1000;

    pub fn limit(&self) -> u64 {
        match self.limit {
            Some(l) if l > 0 => l.min(Self::MAX_LIMIT),
            _ => Self::DEFAULT_LIMIT,
        }
    }

    pub fn page(&self) -> u64 {
        match self.page {
            Some(p) if p > 0 => p,
            _ => 1,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u64,
    pub page: u64,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(limit: u64, page: u64, total: u64) -> Self {
        Self {
            limit,
            page,
            total,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub message: String,
    pub data: Vec<Product>,
    pub pagination: Pagination,
}

/// Фильтры (GET /api/products/filter)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilterQuery {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub color: Option<String>,
    pub min_stock: Option<i64>,
}
