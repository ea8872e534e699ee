pub mod error;
pub mod hash;
pub mod types;

pub use error::{ErrorKind, Result, TetherError};
pub use types::*;
