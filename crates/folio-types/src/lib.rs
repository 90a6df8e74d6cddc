//! Core types and traits for the portfolio assistant proxy.
//!
//! Request/response DTOs match the JSON the browser front-end sends and expects.

mod dto;
mod traits;

pub use dto::*;
pub use traits::*;
