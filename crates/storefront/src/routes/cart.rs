//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the shared market store; handlers only render
//! snapshots and invoke the store's mutation entry points.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use agrimarket_core::{Cart, ProductId, TokenAmount, TransactionRecord};

use crate::checkout::{self, CheckoutOutcome};
use crate::error::AppError;
use crate::filters;
use crate::pinning::PinningClient;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub count: usize,
}

/// Transaction history display data for templates.
#[derive(Clone)]
pub struct HistoryView {
    pub tx_hash: String,
    pub block_hash: String,
    pub block_number: String,
    pub from: String,
    pub to: String,
    pub gas_used: String,
    pub cumulative_gas_used: String,
    pub status: String,
    pub time: String,
    pub product_ids: String,
}

/// Checkout outcome display data for templates.
#[derive(Clone)]
pub struct OutcomeView {
    pub success: bool,
    pub message: String,
    pub progress: Vec<String>,
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Format a base-unit price for display.
fn format_price(price: TokenAmount) -> String {
    format!("{price} tRBTC")
}

fn make_cart_view(cart: &Cart, pinning: &PinningClient) -> CartView {
    let items = cart
        .entries()
        .iter()
        .map(|product| CartItemView {
            id: product.id.as_u64(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_price(product.price),
            image_url: pinning.gateway_url(&product.image_cid),
        })
        .collect();
    let total = cart
        .total()
        .map_or_else(|_| "Loading...".to_string(), format_price);

    CartView {
        items,
        total,
        count: cart.len(),
    }
}

impl From<&TransactionRecord> for HistoryView {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            tx_hash: record.tx_hash.clone(),
            block_hash: record
                .block_hash
                .clone()
                .unwrap_or_else(|| "(pending)".to_string()),
            block_number: record
                .block_number
                .map_or_else(|| "(pending)".to_string(), |number| number.to_string()),
            from: record.from.clone(),
            to: record.to.clone().unwrap_or_else(|| "(none)".to_string()),
            gas_used: record.gas_used.to_string(),
            cumulative_gas_used: record.cumulative_gas_used.to_string(),
            status: record.status.to_string(),
            time: record.time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            product_ids: record
                .product_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&CheckoutOutcome> for OutcomeView {
    fn from(outcome: &CheckoutOutcome) -> Self {
        Self {
            success: outcome.succeeded(),
            message: outcome.message.clone(),
            progress: outcome.progress.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub history: Vec<HistoryView>,
    pub outcome: Option<OutcomeView>,
    pub chain_error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: u64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: u64,
}

async fn render_cart_page(state: &AppState, outcome: Option<OutcomeView>) -> CartShowTemplate {
    let cart = make_cart_view(&state.store().cart_snapshot().await, state.pinning());
    let history = state
        .store()
        .history()
        .await
        .iter()
        .map(HistoryView::from)
        .collect();

    CartShowTemplate {
        cart,
        history,
        outcome,
        chain_error: state.chain_error().map(str::to_string),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    render_cart_page(&state, None).await
}

/// Add a product snapshot to the cart (HTMX).
///
/// Returns the cart count fragment with an HTMX trigger so other cart
/// elements refresh.
///
/// # Errors
///
/// Returns [`AppError::Chain`] if the catalog cannot be read.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let Some(market) = state.market() else {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Html("<span class=\"error\">Chain client unavailable</span>"),
        )
            .into_response());
    };

    let id = ProductId::new(form.product_id);
    let load = market.catalog().await?;

    match load.products.into_iter().find(|product| product.id == id) {
        Some(product) => {
            state.store().add_to_cart(product).await;
            let count = state.store().cart_len().await;
            Ok((
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate { count },
            )
                .into_response())
        }
        None => Ok((
            StatusCode::NOT_FOUND,
            Html("<span class=\"error\">Error adding to cart</span>"),
        )
            .into_response()),
    }
}

/// Remove every entry with the given id from the cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    state
        .store()
        .remove_from_cart(ProductId::new(form.product_id))
        .await;

    let cart = make_cart_view(&state.store().cart_snapshot().await, state.pinning());
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Get the cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    let count = state.store().cart_len().await;
    CartCountTemplate { count }
}

/// Run the checkout flow and render the outcome.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Response {
    let outcome = match state.market() {
        Some(market) => OutcomeView::from(&checkout::run(market, state.store()).await),
        None => OutcomeView {
            success: false,
            message: "Marketplace contract not initialized or cart is empty.".to_string(),
            progress: Vec::new(),
        },
    };

    render_cart_page(&state, Some(outcome)).await.into_response()
}
