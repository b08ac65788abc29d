pub mod aggregate;
pub mod query;

pub use aggregate::{
    ImageDto, Product, ProductDto, ProductImage, ProductVariant, StockDto, StockEntry, VariantDto,
};
pub use query::{Pagination, ProductFilterQuery, ProductListQuery, ProductListResponse};
