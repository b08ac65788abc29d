use serde::{Deserialize, Serialize};

// ============================================================================
// Read model (дерево товар -> варианты -> изображения / остатки)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,

    #[serde(rename = "categoryId")]
    pub category_id: Option<i64>,

    pub name: String,
    pub description: Option<String>,
    pub price: f64,

    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

/// Вариант товара (цвет) со своими изображениями и остатками
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: i64,
    pub color: String,

    #[serde(default)]
    pub images: Vec<ProductImage>,

    #[serde(default)]
    pub stock: Vec<StockEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    pub url: String,
    pub order_index: i32,
}

/// Остаток варианта по размеру. `id` - это id размера.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
}

// ============================================================================
// Write model (создание / обновление)
// ============================================================================

/// DTO для создания и обновления товара.
/// При обновлении `id` обязателен, у вариантов и изображений `id` отсутствует
/// для новых записей.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub variants: Vec<VariantDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub color: String,
    #[serde(default)]
    pub images: Vec<ImageDto>,
    #[serde(default)]
    pub stock: Vec<StockDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub url: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockDto {
    /// id размера
    pub id: i64,
    pub quantity: i32,
}

impl ProductDto {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name must not be empty".into());
        }
        if self.price < 0.0 {
            return Err("Product price must not be negative".into());
        }
        if let Some(v) = self.variants.iter().find(|v| v.color.trim().is_empty()) {
            return Err(format!(
                "Variant color must not be empty (variant id {:?})",
                v.id
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_dto_accepts_client_payload() {
        let json = r##"{
            "name": "Shirt",
            "description": "cotton",
            "price": 100,
            "categoryId": 3,
            "variants": [
                {"color": "#FFF", "images": [{"url": "productos/f1/1", "order_index": 1}],
                 "stock": [{"id": 7, "quantity": 5}]}
            ]
        }"##;
        let dto: ProductDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.id, None);
        assert_eq!(dto.category_id, Some(3));
        assert_eq!(dto.variants[0].images[0].order_index, 1);
        assert_eq!(dto.variants[0].stock[0].id, 7);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name_and_color() {
        let mut dto = ProductDto {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        dto.name = "Shirt".into();
        dto.variants.push(VariantDto::default());
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_product_serializes_category_in_camel_case() {
        let product = Product {
            id: 1,
            category_id: Some(2),
            name: "Shirt".into(),
            description: None,
            price: 10.0,
            variants: vec![],
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["categoryId"], 2);
        assert!(value.get("category_id").is_none());
    }
}
