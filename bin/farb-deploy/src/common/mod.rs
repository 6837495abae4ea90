mod error;
mod logging;

pub use error::*;
pub use logging::*;
