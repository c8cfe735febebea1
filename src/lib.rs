pub mod application;
pub mod cache;
pub mod cms;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod search;
pub(crate) mod util;
