#![doc = "The `maintenance_tracker` library crate."]
#![doc = ""]
#![doc = "Token issuance and validation, the authorization middleware, the task ownership"]
#![doc = "policy, storage adapters, routing and error handling for the maintenance task API."]
#![doc = "The binary (`main.rs`) only loads configuration and wires these together."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
