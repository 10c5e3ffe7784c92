//! Domain models for the POS backend

mod catalog;
mod order;
mod user;

pub use catalog::*;
pub use order::*;
pub use user::*;
