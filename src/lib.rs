pub mod auth;
pub mod blueprint;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod util;
