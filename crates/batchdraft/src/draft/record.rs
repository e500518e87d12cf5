//! Draft product records as edited in the upload grid.

use serde::{Deserialize, Serialize};

/// Suffix appended to the name of a duplicated row.
pub const DUPLICATE_NAME_SUFFIX: &str = " (copy)";
/// Suffix appended to the SKU of a duplicated row.
pub const DUPLICATE_SKU_SUFFIX: &str = "-copy";

/// Product type accepted by the creation endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Simple,
    Variable,
    Grouped,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Simple => "simple",
            ProductType::Variable => "variable",
            ProductType::Grouped => "grouped",
        }
    }

    /// Parses a type label case-insensitively. Unknown labels yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Some(ProductType::Simple),
            "variable" => Some(ProductType::Variable),
            "grouped" => Some(ProductType::Grouped),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image attached to a draft, or the explicit "no image" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "url")]
pub enum ImageRef {
    #[default]
    None,
    Url(String),
}

impl ImageRef {
    /// Builds an image reference from a raw cell value; blank means no image.
    pub fn from_cell(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            ImageRef::None
        } else {
            ImageRef::Url(value.to_string())
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            ImageRef::None => None,
            ImageRef::Url(url) => Some(url),
        }
    }
}

/// Upload lifecycle of one row.
///
/// The error message lives inside the `Error` variant, so a message exists
/// exactly when the row is in error and disappears on any other transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    #[default]
    Pending,
    Uploading,
    Success,
    Error { message: String },
}

impl RowStatus {
    pub fn error(message: impl Into<String>) -> Self {
        RowStatus::Error {
            message: message.into(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RowStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::Pending => "pending",
            RowStatus::Uploading => "uploading",
            RowStatus::Success => "success",
            RowStatus::Error { .. } => "error",
        }
    }
}

/// One product awaiting creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub(crate) id: String,
    pub name: String,
    pub product_type: ProductType,
    /// Kept as typed by the user; parsed only during validation.
    pub price: String,
    pub sku: String,
    pub description: String,
    pub short_description: String,
    pub manage_stock: bool,
    pub stock_quantity: u32,
    pub category_id: Option<u64>,
    pub image: ImageRef,
    pub seo_title: String,
    pub seo_description: String,
    pub focus_keyword: String,
    pub(crate) status: RowStatus,
}

impl DraftRecord {
    /// Creates an empty pending draft with a fresh id.
    pub fn empty() -> Self {
        Self {
            id: new_row_id(),
            name: String::new(),
            product_type: ProductType::default(),
            price: String::new(),
            sku: String::new(),
            description: String::new(),
            short_description: String::new(),
            manage_stock: false,
            stock_quantity: 0,
            category_id: None,
            image: ImageRef::None,
            seo_title: String::new(),
            seo_description: String::new(),
            focus_keyword: String::new(),
            status: RowStatus::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &RowStatus {
        &self.status
    }

    /// Builds the copy inserted by `duplicate_row`: new id, pending status,
    /// name and SKU suffixed.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            id: new_row_id(),
            name: format!("{}{}", self.name, DUPLICATE_NAME_SUFFIX),
            sku: format!("{}{}", self.sku, DUPLICATE_SKU_SUFFIX),
            status: RowStatus::Pending,
            ..self.clone()
        }
    }

    /// Replaces a single field.
    pub(crate) fn apply(&mut self, field: DraftField) {
        match field {
            DraftField::Name(v) => self.name = v,
            DraftField::ProductType(v) => self.product_type = v,
            DraftField::Price(v) => self.price = v,
            DraftField::Sku(v) => self.sku = v,
            DraftField::Description(v) => self.description = v,
            DraftField::ShortDescription(v) => self.short_description = v,
            DraftField::ManageStock(v) => self.manage_stock = v,
            DraftField::StockQuantity(v) => self.stock_quantity = v,
            DraftField::CategoryId(v) => self.category_id = v,
            DraftField::Image(v) => self.image = v,
            DraftField::SeoTitle(v) => self.seo_title = v,
            DraftField::SeoDescription(v) => self.seo_description = v,
            DraftField::FocusKeyword(v) => self.focus_keyword = v,
        }
    }
}

impl Default for DraftRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single-field edit issued from the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum DraftField {
    Name(String),
    ProductType(ProductType),
    Price(String),
    Sku(String),
    Description(String),
    ShortDescription(String),
    ManageStock(bool),
    StockQuantity(u32),
    CategoryId(Option<u64>),
    Image(ImageRef),
    SeoTitle(String),
    SeoDescription(String),
    FocusKeyword(String),
}

pub(crate) fn new_row_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
