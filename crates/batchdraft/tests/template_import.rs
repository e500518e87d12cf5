//! Offline drafting: fill the exported template, import it, upload it.

mod common;

use std::io::Write;
use std::sync::Arc;

use batchdraft::template::TEMPLATE_COLUMNS;
use batchdraft::{
    export_template, import_rows, ImageRef, ProductType, RowStatus, SharedRowStore,
    TemplateError, UploadOrchestrator, UploadSettings,
};
use common::ScriptedCreator;

#[test]
fn test_exported_template_reimports_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(export_template().unwrap().as_bytes()).unwrap();

    let records = import_rows(std::fs::File::open(file.path()).unwrap()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Classic Cotton T-Shirt, \"Crew\" Neck");
    assert_eq!(
        records[0].description,
        "Soft, breathable cotton tee.\nMachine washable."
    );
    assert_eq!(records[0].product_type, ProductType::Simple);
}

#[test]
fn test_import_appends_after_existing_rows() {
    let store = SharedRowStore::default();
    let text = format!(
        "{}\n\"Mug, large\",variable,8.50,MUG-L,Big mug,Mug,no,0,3,https://cdn.example.com/mug.png,,,\n",
        TEMPLATE_COLUMNS.join(",")
    );

    let records = import_rows(text.as_bytes()).unwrap();
    let ids = store.append_records(records);

    assert_eq!(store.len(), 6);
    let row = store.get(&ids[0]).unwrap();
    assert_eq!(row.name, "Mug, large");
    assert_eq!(row.product_type, ProductType::Variable);
    assert_eq!(row.category_id, Some(3));
    assert_eq!(
        row.image,
        ImageRef::Url("https://cdn.example.com/mug.png".to_string())
    );
    assert_eq!(row.status(), &RowStatus::Pending);
    assert!(store.ids_are_unique());
}

#[test]
fn test_truncated_header_is_rejected() {
    let text = TEMPLATE_COLUMNS[..5].join(",");
    let err = import_rows(text.as_bytes()).unwrap_err();
    assert!(matches!(err, TemplateError::HeaderMismatch { .. }));
}

#[tokio::test]
async fn test_imported_rows_upload_in_file_order() {
    let text = format!(
        "{}\nBook,simple,12,BK-1,Hardcover,Book,,,,,,,\nPen,simple,abc,PN-1,Blue pen,Pen,,,,,,,\nNote,simple,3,NT-1,Notebook,Note,,,,,,,\n",
        TEMPLATE_COLUMNS.join(",")
    );
    let store = SharedRowStore::new(0);
    let ids = store.append_records(import_rows(text.as_bytes()).unwrap());

    let creator = Arc::new(ScriptedCreator::new());
    let orchestrator =
        UploadOrchestrator::new(store.clone(), creator.clone(), UploadSettings::immediate());
    let summary = orchestrator.upload_all().await.unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(
        creator.dispatched_skus(),
        vec!["BK-1".to_string(), "NT-1".to_string()]
    );
    assert_eq!(
        store.get(&ids[1]).unwrap().status(),
        &RowStatus::error("price must be a valid number")
    );
}
