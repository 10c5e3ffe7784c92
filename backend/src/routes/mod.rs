//! Route definitions for the POS backend

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - admin master data and administration
        .nest("/admin", admin_routes())
        // Protected routes - cashier checkout
        .nest("/cashier", cashier_routes())
        // Protected routes - customer self-service
        .nest("/customer", customer_routes())
        // Protected routes - own profile
        .nest("/profile", profile_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/register/verify", post(handlers::verify_registration))
        .route("/login", post(handlers::login))
        .route("/password/forgot", post(handlers::forgot_password))
        .route("/password/reset", post(handlers::reset_password))
}

/// Admin routes (protected; handlers enforce the ADMIN role)
fn admin_routes() -> Router<AppState> {
    Router::new()
        // Products
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/export", get(handlers::export_products_csv))
        .route(
            "/products/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/products/:product_id/image",
            get(handlers::get_product_image).post(handlers::upload_product_image),
        )
        .route(
            "/products/:product_id/units",
            get(handlers::list_units_for_product),
        )
        // Product units
        .route("/units", post(handlers::create_unit))
        .route(
            "/units/:unit_id",
            put(handlers::update_unit).delete(handlers::delete_unit),
        )
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/export", get(handlers::export_categories_csv))
        .route(
            "/categories/:category_id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/categories/:category_id/image",
            get(handlers::get_category_image).post(handlers::upload_category_image),
        )
        // Suppliers
        .route(
            "/suppliers",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/suppliers/:supplier_id",
            put(handlers::update_supplier).delete(handlers::delete_supplier),
        )
        // Users
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/export", get(handlers::export_users_csv))
        .route(
            "/users/:user_id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::deactivate_user),
        )
        // Orders
        .route("/orders", get(handlers::list_orders))
        .route("/orders/:order_id", get(handlers::get_order))
        .route("/orders/:order_id/status", put(handlers::update_order_status))
        .route("/payment-methods", get(handlers::list_payment_methods))
        // Reports
        .route("/reports/summary", get(handlers::report_summary))
        .route("/reports/daily", get(handlers::report_daily))
        .route(
            "/reports/payment-methods",
            get(handlers::report_payment_methods),
        )
        .route("/reports/transactions", get(handlers::report_transactions))
        .route("/reports/products", get(handlers::report_per_product))
        .route("/reports/cashiers", get(handlers::report_per_cashier))
        .route("/reports/categories", get(handlers::report_per_category))
        .route("/reports/yearly", get(handlers::report_yearly))
        // Dashboard
        .route("/dashboard/stats", get(handlers::dashboard_stats))
        .route("/dashboard/top-products", get(handlers::dashboard_top_products))
        .route(
            "/dashboard/payment-shares",
            get(handlers::dashboard_payment_shares),
        )
        .route(
            "/dashboard/latest-products",
            get(handlers::dashboard_latest_products),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Cashier routes (protected; handlers enforce the KASIR role)
fn cashier_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(handlers::cashier_checkout))
        .route("/orders", get(handlers::cashier_history))
        .route("/products/search", get(handlers::search_products))
        .route(
            "/products/category/:category_id",
            get(handlers::products_by_category),
        )
        .route(
            "/orders/pickup/:pickup_code",
            get(handlers::order_by_pickup_code),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer self-service routes (protected; handlers enforce PELANGGAN)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(handlers::customer_catalog))
        .route("/orders", get(handlers::customer_orders).post(handlers::customer_place_order))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Profile routes (protected, any role)
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_me).put(handlers::update_profile))
        .route("/password", put(handlers::change_password))
        .route_layer(middleware::from_fn(auth_middleware))
}
