pub mod catalog;
pub mod client;
pub mod error;
pub mod http;
pub mod package;
pub mod runtime;
pub mod server;
