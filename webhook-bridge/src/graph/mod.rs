//! Outbound Graph API calls.

pub mod client;

pub use client::{GraphClient, GraphError, GraphResponse};
