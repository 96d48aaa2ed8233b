pub mod cast;
pub mod error;
pub mod layout;
pub mod metadata;

pub use cast::*;
pub use error::*;
pub use metadata::*;
