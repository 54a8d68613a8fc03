pub mod config;
pub mod dao;
pub mod error;
pub mod model;
pub mod routes;
pub mod utils;
