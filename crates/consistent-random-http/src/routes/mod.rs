//! Demo route modules.

pub mod health;
pub mod random;
