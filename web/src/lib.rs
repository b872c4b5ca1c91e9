pub mod catalog;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod map;
pub mod services;
pub mod utils;

pub use shared_types::{Facility, FavoriteEntry, Position, UserSession};
