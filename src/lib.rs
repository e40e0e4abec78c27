#![doc = "The `taskshare` library crate."]
#![doc = ""]
#![doc = "Multi-user task management over HTTP: registration and bearer-token login,"]
#![doc = "personal tasks with categories, tags and due dates, sharing tasks with other"]
#![doc = "users, and JSON/CSV export. The binary (`main.rs`) wires these modules into an"]
#![doc = "actix-web server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
