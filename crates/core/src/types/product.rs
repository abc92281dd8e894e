//! Marketplace products.

use serde::{Deserialize, Serialize};

use crate::types::{ProductId, TokenAmount};

/// A product listed on the marketplace contract.
///
/// Products are contract-assigned and read-only once created: the client
/// never mutates or deletes one, it can only hide it from the local view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Contract-assigned identifier, one-based and monotonically increasing.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Content identifier of the pinned product image.
    pub image_cid: String,
    /// Price in base units.
    pub price: TokenAmount,
}
