//! Application layer: the content source seam, cached page queries and
//! process-level errors.

pub mod error;
pub mod service;
pub mod source;
