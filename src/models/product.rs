//! Product model for the products catalogue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalogue product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    /// Image URL or public path
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Partial update for a product
///
/// Keys absent from the JSON body leave the stored value alone. An empty
/// string for `image` or `videoUrl` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub image: Option<String>,
    pub features: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub video_url: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl CreateProductInput {
    /// Build the stored product, normalising blank optional fields to `None`
    pub fn into_product(self, id: String, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            description: self.description,
            long_description: self.long_description,
            image: self.image.and_then(non_empty),
            features: self.features,
            tech_stack: self.tech_stack,
            video_url: self.video_url.and_then(non_empty),
            created_at,
        }
    }
}

impl UpdateProductInput {
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.category.is_some()
            || self.description.is_some()
            || self.long_description.is_some()
            || self.image.is_some()
            || self.features.is_some()
            || self.tech_stack.is_some()
            || self.video_url.is_some()
    }

    /// Merge the provided fields into `product`; `id` and `created_at` never change
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(long_description) = self.long_description {
            product.long_description = long_description;
        }
        if let Some(image) = self.image {
            product.image = non_empty(image);
        }
        if let Some(features) = self.features {
            product.features = features;
        }
        if let Some(tech_stack) = self.tech_stack {
            product.tech_stack = tech_stack;
        }
        if let Some(video_url) = self.video_url {
            product.video_url = non_empty(video_url);
        }
    }
}
