//! CSV template for offline drafting.
//!
//! [`export_template`] produces the header plus one example row; a filled copy
//! can be read back with [`import_rows`] and appended to the grid.

use std::io::Read;

use crate::draft::{DraftRecord, ImageRef, ProductType};
use crate::error::TemplateError;

/// Fixed column order of the template.
pub const TEMPLATE_COLUMNS: [&str; 13] = [
    "Name",
    "Type",
    "Regular Price",
    "SKU",
    "Description",
    "Short Description",
    "Manage Stock",
    "Stock Quantity",
    "Category ID",
    "Image URL",
    "SEO Title",
    "SEO Description",
    "Focus Keyword",
];

const EXAMPLE_ROW: [&str; 13] = [
    "Classic Cotton T-Shirt, \"Crew\" Neck",
    "simple",
    "19.99",
    "TSHIRT-001",
    "Soft, breathable cotton tee.\nMachine washable.",
    "Everyday cotton tee",
    "yes",
    "25",
    "15",
    "https://example.com/wp-content/uploads/tshirt.jpg",
    "Classic Cotton T-Shirt | Example Store",
    "A soft, breathable cotton t-shirt for everyday wear.",
    "cotton t-shirt",
];

/// Renders the template as comma-separated text. Every field is quoted as
/// needed, so commas, quotes and line breaks survive a round trip.
pub fn export_template() -> Result<String, TemplateError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TEMPLATE_COLUMNS)?;
    writer.write_record(EXAMPLE_ROW)?;
    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|e| TemplateError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}

/// Reads a filled template into fresh pending drafts.
///
/// The header must match [`TEMPLATE_COLUMNS`]. Unknown product types fall back
/// to `simple`; unparseable numbers fall back to their empty value.
pub fn import_rows<R: Read>(reader: R) -> Result<Vec<DraftRecord>, TemplateError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let found: Vec<&str> = headers.iter().map(str::trim).collect();
    if found != TEMPLATE_COLUMNS {
        return Err(TemplateError::HeaderMismatch {
            expected: TEMPLATE_COLUMNS.join(","),
            found: found.join(","),
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).unwrap_or("");
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let product_type = ProductType::parse(cell(1)).unwrap_or_else(|| {
            if !cell(1).trim().is_empty() {
                log::warn!("Unknown product type '{}', using simple", cell(1));
            }
            ProductType::Simple
        });

        let mut record = DraftRecord::empty();
        record.name = cell(0).to_string();
        record.product_type = product_type;
        record.price = cell(2).to_string();
        record.sku = cell(3).to_string();
        record.description = cell(4).to_string();
        record.short_description = cell(5).to_string();
        record.manage_stock = parse_flag(cell(6));
        record.stock_quantity = cell(7).trim().parse().unwrap_or(0);
        record.category_id = cell(8).trim().parse().ok();
        record.image = ImageRef::from_cell(cell(9));
        record.seo_title = cell(10).to_string();
        record.seo_description = cell(11).to_string();
        record.focus_keyword = cell(12).to_string();
        records.push(record);
    }

    log::info!("Imported {} draft row(s) from template", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_header_and_one_row() {
        let text = export_template().unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 2);
        let header: Vec<&str> = rows[0].iter().collect();
        assert_eq!(header, TEMPLATE_COLUMNS);
        assert_eq!(rows[1].len(), TEMPLATE_COLUMNS.len());
        assert_eq!(&rows[1][0], "Classic Cotton T-Shirt, \"Crew\" Neck");
        assert!(rows[1][4].contains('\n'));
    }

    #[test]
    fn test_example_row_imports_as_valid_draft() {
        let text = export_template().unwrap();
        let records = import_rows(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.sku, "TSHIRT-001");
        assert!(record.manage_stock);
        assert_eq!(record.stock_quantity, 25);
        assert_eq!(record.category_id, Some(15));
        assert!(record.image.url().is_some());
        assert_eq!(crate::validation::validate(record), Ok(()));
    }

    #[test]
    fn test_import_lenient_cells() {
        let csv_text = format!(
            "{}\nLamp,external,12,LMP,Desk lamp,Lamp,no,lots,,,,,\n,,,,,,,,,,,,\nShort,grouped\n",
            TEMPLATE_COLUMNS.join(",")
        );
        let records = import_rows(csv_text.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_type, ProductType::Simple);
        assert!(!records[0].manage_stock);
        assert_eq!(records[0].stock_quantity, 0);
        assert_eq!(records[0].category_id, None);
        assert_eq!(records[0].image, ImageRef::None);
        assert_eq!(records[1].product_type, ProductType::Grouped);
        assert_eq!(records[1].price, "");
    }

    #[test]
    fn test_import_rejects_wrong_header() {
        let result = import_rows("name,price\nA,1\n".as_bytes());
        assert!(matches!(result, Err(TemplateError::HeaderMismatch { .. })));
    }
}
