//! Catalog types: products, their purchasable variants, and categories.
//!
//! Field names follow the storefront API's JSON (`imageUrl`,
//! `dimensionsOptions`, `category_name`).

use serde::{Deserialize, Serialize};

use crate::{CategoryId, Price, ProductId, VariantId};

/// A purchasable option of a product, such as a length or diameter.
///
/// Two variants of the same product are distinct purchasable units; the
/// cart tells them apart by [`Variant::dimension`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    /// Human-readable label, e.g. `1/2" Diameter`.
    pub dimension: String,
    pub price: Price,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    /// Flat price, used when the product has no variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Ordered variant options.
    #[serde(
        rename = "dimensionsOptions",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub variants: Vec<Variant>,
    #[serde(rename = "category_name", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Resolve the unit price for a purchase of this product.
    ///
    /// The selected variant's price wins, then the flat price, then zero.
    #[must_use]
    pub fn unit_price(&self, variant: Option<&Variant>) -> Price {
        variant
            .map(|v| v.price)
            .or(self.price)
            .unwrap_or(Price::ZERO)
    }

    /// The price shown in listings and used for sorting: the first
    /// variant's price, else the flat price, else zero.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.unit_price(self.default_variant())
    }

    /// The variant preselected on product pages and quick add-to-cart.
    #[must_use]
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Whether the buyer must choose a variant before purchasing.
    #[must_use]
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Look up a variant by its label.
    #[must_use]
    pub fn variant_by_dimension(&self, dimension: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.dimension == dimension)
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }
}

/// A product category used for filtering listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
