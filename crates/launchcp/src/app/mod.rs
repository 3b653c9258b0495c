//! Application layer orchestrating domain logic and infrastructure.

pub mod compare;
pub mod render;
pub mod selection;
pub mod session;
pub mod validate;
