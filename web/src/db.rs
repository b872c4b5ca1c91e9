pub mod entities;
pub mod favorites_repository;
pub mod repository;
pub mod search_repository;
pub mod store;
