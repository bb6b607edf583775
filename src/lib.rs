pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod server;
pub mod service;
pub mod storage;

pub use server::Server;
pub use service::FileManager;
