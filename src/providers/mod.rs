//! Provider implementations

pub mod file;
pub mod http;

pub use file::FileProvider;
pub use http::HttpProvider;
