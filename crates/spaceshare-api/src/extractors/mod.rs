//! Custom Axum extractors.

pub mod client;
pub mod owner;
pub mod visitor;

pub use client::client_ip;
pub use owner::AuthOwner;
pub use visitor::visitor_from_headers;
