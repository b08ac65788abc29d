pub mod image_repository;
pub mod repository;
pub mod service;
pub mod stock_repository;
pub mod tree;
pub mod variant_repository;
