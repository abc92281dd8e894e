//! Home page: the product creation form.
//!
//! Listing a product is two independent operations chained by the user:
//! pin the image (HTMX fragment carrying the content identifier back into
//! the form), then submit the contract write. Every failure re-renders the
//! form with a message; the form stays usable.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use agrimarket_core::TokenAmount;

use crate::checkout::PurchaseGateway;
use crate::filters;
use crate::pinning::PinningClient;
use crate::state::AppState;

/// Form field values, echoed back so a failed submission keeps its input.
#[derive(Clone, Default)]
pub struct ProductFormView {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_cid: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Active account, when a signing key is configured.
    pub account: Option<String>,
    /// Current network gas price, for display only.
    pub gas_price_gwei: Option<String>,
    /// Startup chain error, if the client could not be built.
    pub chain_error: Option<String>,
    /// Current form values.
    pub form: ProductFormView,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Pin result fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/pin_result.html")]
pub struct PinResultTemplate {
    pub cid: String,
    pub message: String,
    pub failed: bool,
}

/// Create product form data.
#[derive(Debug, Deserialize)]
pub struct CreateProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub image_cid: String,
}

/// Shared page context: account banner and gas price display.
struct PageContext {
    account: Option<String>,
    gas_price_gwei: Option<String>,
    chain_error: Option<String>,
}

impl PageContext {
    async fn load(state: &AppState) -> Self {
        let account = state
            .market()
            .and_then(|market| market.account())
            .map(|address| address.to_string());

        let gas_price_gwei = match state.market() {
            Some(market) => match market.gas_price().await {
                Ok(price) => Some(format_gwei(price)),
                Err(error) => {
                    tracing::warn!(%error, "gas price fetch failed");
                    None
                }
            },
            None => None,
        };

        Self {
            account,
            gas_price_gwei,
            chain_error: state.chain_error().map(str::to_string),
        }
    }

    fn page(
        self,
        form: ProductFormView,
        success: Option<String>,
        error: Option<String>,
    ) -> HomeTemplate {
        HomeTemplate {
            account: self.account,
            gas_price_gwei: self.gas_price_gwei,
            chain_error: self.chain_error,
            form,
            success,
            error,
        }
    }
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    PageContext::load(&state)
        .await
        .page(ProductFormView::default(), None, None)
}

/// Pin a product image (HTMX).
///
/// The image check runs before any network call: a non-image upload never
/// reaches the pinning service.
#[instrument(skip(state, multipart))]
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> impl IntoResponse {
    let upload = match read_file_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return PinResultTemplate {
                cid: String::new(),
                message: "No file selected. Please select an image file to upload.".to_string(),
                failed: true,
            };
        }
        Err(message) => {
            return PinResultTemplate {
                cid: String::new(),
                message,
                failed: true,
            };
        }
    };

    if PinningClient::validate_image(
        &upload.file_name,
        upload.content_type.as_deref(),
        upload.bytes.len(),
    )
    .is_err()
    {
        return PinResultTemplate {
            cid: String::new(),
            message: "Invalid file type. Please select an image file.".to_string(),
            failed: true,
        };
    }

    let content_type = upload
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    match state
        .pinning()
        .pin_image(&upload.file_name, content_type, upload.bytes.to_vec())
        .await
    {
        Ok(cid) => PinResultTemplate {
            cid,
            message: "Image uploaded successfully!".to_string(),
            failed: false,
        },
        Err(error) => {
            tracing::error!(%error, "image pinning failed");
            PinResultTemplate {
                cid: String::new(),
                message: "Error uploading image. Please try again.".to_string(),
                failed: true,
            }
        }
    }
}

/// Submit the contract write that lists the product.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<CreateProductForm>,
) -> impl IntoResponse {
    let context = PageContext::load(&state).await;
    let entered = ProductFormView {
        name: form.name.clone(),
        description: form.description.clone(),
        price: form.price.clone(),
        image_cid: form.image_cid.clone(),
    };

    // Submission is blocked until an image has been pinned.
    if form.image_cid.trim().is_empty() {
        return context.page(entered, None, Some("Image not uploaded yet".to_string()));
    }

    let Some(market) = state.market() else {
        return context.page(
            entered,
            None,
            Some("Marketplace connection is not initialized. Please check the chain configuration.".to_string()),
        );
    };

    if form.name.trim().is_empty() {
        return context.page(entered, None, Some("Product name is required.".to_string()));
    }

    let price = match TokenAmount::from_display_str(&form.price) {
        Ok(price) if !price.is_zero() => price,
        Ok(_) => {
            return context.page(
                entered,
                None,
                Some("Price must be greater than zero.".to_string()),
            );
        }
        Err(error) => {
            return context.page(entered, None, Some(format!("Invalid price: {error}")));
        }
    };

    match market
        .create_product(
            form.name.trim(),
            form.description.trim(),
            form.image_cid.trim(),
            price,
        )
        .await
    {
        Ok(receipt) if receipt.status.is_success() => {
            // Reset fields after a successful listing.
            context.page(
                ProductFormView::default(),
                Some("Product added successfully!".to_string()),
                None,
            )
        }
        Ok(_) => context.page(
            entered,
            None,
            Some("Product creation reverted on chain. Please try again.".to_string()),
        ),
        Err(error) => {
            tracing::error!(%error, "createProduct failed");
            context.page(
                entered,
                None,
                Some(format!("Failed to add product. Please try again. {error}")),
            )
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

struct FileUpload {
    file_name: String,
    content_type: Option<String>,
    bytes: axum::body::Bytes,
}

/// Pull the `file` part out of the multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<FileUpload>, String> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(error) => return Err(format!("Upload failed: {error}")),
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        return match field.bytes().await {
            Ok(bytes) => Ok(Some(FileUpload {
                file_name,
                content_type,
                bytes,
            })),
            Err(error) => Err(format!("Upload failed: {error}")),
        };
    }
}

/// Render a wei-per-gas price in Gwei.
fn format_gwei(wei_per_gas: u128) -> String {
    i128::try_from(wei_per_gas)
        .ok()
        .and_then(|value| Decimal::try_from_i128_with_scale(value, 9).ok())
        .map_or_else(
            || format!("{wei_per_gas} wei"),
            |gwei| gwei.normalize().to_string(),
        )
}

#[cfg(test)]
mod tests {
    use super::format_gwei;

    #[test]
    fn test_format_gwei_whole() {
        assert_eq!(format_gwei(60_000_000_000), "60");
    }

    #[test]
    fn test_format_gwei_fractional() {
        assert_eq!(format_gwei(1_500_000_000), "1.5");
    }

    #[test]
    fn test_format_gwei_sub_gwei() {
        assert_eq!(format_gwei(60_000_000), "0.06");
    }
}
