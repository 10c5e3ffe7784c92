//! Business logic services for the POS backend

pub mod auth;
pub mod category;
pub mod dashboard;
pub mod housekeeping;
pub mod order;
pub mod product;
pub mod profile;
pub mod report;
pub mod supplier;
pub mod unit;
pub mod user;
