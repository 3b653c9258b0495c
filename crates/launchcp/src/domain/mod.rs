//! Core classpath types and errors.

pub mod errors;
pub mod model;
