//! JobFlow API: job, invoice, and expense tracking for one-person
//! businesses, behind a token-authenticated REST interface.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pdf;
pub mod routes;
pub mod storage;
pub mod store;
