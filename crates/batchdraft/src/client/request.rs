use serde::{Deserialize, Serialize};

use crate::draft::{DraftRecord, ProductType};

pub const META_SEO_TITLE: &str = "_seo_title";
pub const META_SEO_DESCRIPTION: &str = "_seo_description";
pub const META_FOCUS_KEYWORD: &str = "_focus_keyword";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: String,
}

/// Body of one product creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub regular_price: String,
    pub sku: String,
    pub description: String,
    pub short_description: String,
    pub manage_stock: bool,
    pub stock_quantity: u32,
    pub categories: Vec<CategoryRef>,
    pub images: Vec<ImageSource>,
    pub meta_data: Vec<MetaEntry>,
}

impl CreateProductRequest {
    pub fn from_record(record: &DraftRecord) -> Self {
        let meta = |key: &str, value: &str| MetaEntry {
            key: key.to_string(),
            value: value.to_string(),
        };

        Self {
            name: record.name.trim().to_string(),
            product_type: record.product_type,
            regular_price: record.price.trim().to_string(),
            sku: record.sku.trim().to_string(),
            description: record.description.clone(),
            short_description: record.short_description.clone(),
            manage_stock: record.manage_stock,
            stock_quantity: record.stock_quantity,
            categories: record
                .category_id
                .map(|id| vec![CategoryRef { id }])
                .unwrap_or_default(),
            images: record
                .image
                .url()
                .map(|src| {
                    vec![ImageSource {
                        src: src.to_string(),
                    }]
                })
                .unwrap_or_default(),
            meta_data: vec![
                meta(META_SEO_TITLE, &record.seo_title),
                meta(META_SEO_DESCRIPTION, &record.seo_description),
                meta(META_FOCUS_KEYWORD, &record.focus_keyword),
            ],
        }
    }
}

/// What the API hands back for a created product. Only the id is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProduct {
    #[serde(default)]
    pub id: Option<u64>,
}
