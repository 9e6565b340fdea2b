pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod inspect;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod reshape;

pub use error::{Result, ToolError};
