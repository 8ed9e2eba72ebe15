pub mod business;
pub mod client;
pub mod expense;
pub mod invoice;
pub mod job;
pub mod mileage;
pub mod receipt;
pub mod user;
pub mod vendor;

pub use business::Business;
pub use client::Client;
pub use expense::Expense;
pub use invoice::Invoice;
pub use job::Job;
pub use mileage::Mileage;
pub use receipt::Receipt;
pub use user::{User, UserProfile};
pub use vendor::Vendor;
