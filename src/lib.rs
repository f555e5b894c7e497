pub mod bootstrap;
pub mod config;
pub mod document;
mod error;
pub mod filter;
pub mod resolve;
pub mod scan;
pub mod watch;
pub mod widget;

pub use bootstrap::bootstrap;
pub use error::{LightwireError, Result};
