//! Stored procedure regression checks: capture a procedure's result set as a
//! baseline, then compare later runs against the most recent one.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod verify;

pub use error::{Error, Result};
