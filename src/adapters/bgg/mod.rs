//! BoardGameGeek adapter. XML API v2 client and document mapping.

pub mod client;
pub mod mapper;

pub use client::BggClient;
