//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (product creation form)
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product catalog
//! POST /products               - Create product (contract write)
//! POST /products/upload        - Pin product image (HTMX fragment)
//! POST /products/hide          - Hide product from the local view
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page incl. transaction history
//! POST /cart/add               - Add to cart (returns cart_count fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Run the checkout flow, render the outcome
//! ```

pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(home::create))
        .route("/upload", post(home::upload))
        .route("/hide", post(products::hide))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::show))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", post(cart::checkout))
}
