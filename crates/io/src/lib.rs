// File I/O operations

pub mod csv;
pub mod decode;
pub mod discover;
pub mod error;
pub mod json;
pub mod xml;

pub use error::IoError;
