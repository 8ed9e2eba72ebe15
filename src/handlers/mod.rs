// HTTP handlers, grouped by resource.

pub mod account;
pub mod auth;
pub mod clients;
pub mod expenses;
pub mod invoices;
pub mod jobs;
pub mod mileage;
pub mod receipts;
pub mod vendors;
