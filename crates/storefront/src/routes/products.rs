//! Product catalog routes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use agrimarket_core::{Product, ProductId, TokenAmount};

use crate::filters;
use crate::pinning::PinningClient;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: String,
}

/// A catalog entry that failed to load.
#[derive(Clone)]
pub struct MissingView {
    pub id: u64,
    pub error: String,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub missing: Vec<MissingView>,
    pub chain_error: Option<String>,
    pub hidden_notice: Option<u64>,
}

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub hidden: Option<u64>,
}

/// Hide product form data.
#[derive(Debug, Deserialize)]
pub struct HideProductForm {
    pub product_id: u64,
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Format a base-unit price for display.
fn format_price(price: TokenAmount) -> String {
    format!("{price} tRBTC")
}

impl ProductView {
    fn from_product(product: &Product, pinning: &PinningClient) -> Self {
        Self {
            id: product.id.as_u64(),
            name: product.name.clone(),
            description: product.description.clone(),
            image_url: pinning.gateway_url(&product.image_cid),
            price: format_price(product.price),
        }
    }
}

/// Display the product catalog.
///
/// Per-item load failures are listed separately instead of hiding the
/// whole catalog; locally hidden products are filtered out.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let mut template = ProductsIndexTemplate {
        products: Vec::new(),
        missing: Vec::new(),
        chain_error: state.chain_error().map(str::to_string),
        hidden_notice: query.hidden,
    };

    let Some(market) = state.market() else {
        return template;
    };

    match market.catalog().await {
        Ok(load) => {
            let hidden = state.store().hidden_products().await;
            template.products = load
                .products
                .iter()
                .filter(|product| !hidden.contains(&product.id))
                .map(|product| ProductView::from_product(product, state.pinning()))
                .collect();
            template.missing = load
                .missing
                .into_iter()
                .map(|(id, error)| MissingView { id, error })
                .collect();
        }
        Err(error) => {
            tracing::error!(%error, "catalog load failed");
            template.chain_error = Some(error.to_string());
        }
    }

    template
}

/// Hide a product from the local view.
///
/// Nothing is deleted on chain; the product only disappears from this
/// session's catalog (and cart).
#[instrument(skip(state))]
pub async fn hide(
    State(state): State<AppState>,
    Form(form): Form<HideProductForm>,
) -> Redirect {
    state
        .store()
        .hide_product(ProductId::new(form.product_id))
        .await;
    Redirect::to(&format!("/products?hidden={}", form.product_id))
}
