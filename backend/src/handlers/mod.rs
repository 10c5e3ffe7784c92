//! HTTP handlers for the POS backend

pub mod auth;
pub mod cashier;
pub mod category;
pub mod customer;
pub mod dashboard;
pub mod health;
pub mod order;
pub mod product;
pub mod profile;
pub mod report;
pub mod supplier;
pub mod unit;
pub mod user;

pub use auth::*;
pub use cashier::*;
pub use category::*;
pub use customer::*;
pub use dashboard::*;
pub use health::*;
pub use order::*;
pub use product::*;
pub use profile::*;
pub use report::*;
pub use supplier::*;
pub use unit::*;
pub use user::*;

use shared::types::Pagination;

/// Build pagination from optional query parameters, clamped to sane bounds
pub(crate) fn pagination(page: Option<u32>, per_page: Option<u32>) -> Pagination {
    let defaults = Pagination::default();
    Pagination {
        page: page.unwrap_or(defaults.page).max(1),
        per_page: per_page.unwrap_or(defaults.per_page).clamp(1, 100),
    }
}
