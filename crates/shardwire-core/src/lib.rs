pub mod constants;
pub mod error;

pub use error::{Error, ParseFailure, Result};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
