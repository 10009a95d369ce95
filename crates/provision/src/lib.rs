//! Client for the provision service, the external authority that answers
//! "does this access key have access to this account?".

pub mod client;
pub mod config;

pub use client::{AccountChecker, ProvisionClient};
pub use config::ProvisionConfig;
