pub mod archive;
pub mod error;
pub mod executor;
pub mod grouping;
pub mod lookup;
pub mod spreadsheet;
pub mod store;
pub mod template;
pub mod uploader;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use error::ImportError;
pub use executor::ImportExecutor;
pub use store::SeaOrmCatalogStore;
