pub mod api;
pub mod auth;
pub mod bidding;
pub mod config;
pub mod error;
pub mod events;
pub mod listings;
pub mod manage;
pub mod model;
pub mod profile;
pub mod render;
pub mod session;
pub mod validation;
