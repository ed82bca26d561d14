pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod pages;
pub mod portal;
pub mod session;

pub use config::PortalConfig;
pub use error::Error;
pub use portal::Portal;
