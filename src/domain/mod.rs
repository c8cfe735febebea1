//! Domain records normalized from the CMS and helpers that stay pure.

pub mod entities;
pub mod error;
pub mod media;
