//! HTTP transport used by the update client.

mod client;

pub use client::{HttpClient, HttpError};
