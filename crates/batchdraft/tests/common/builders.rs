use batchdraft::{DraftRecord, SharedRowStore};

/// A draft that passes every validation rule.
pub fn draft(name: &str, price: &str, sku: &str) -> DraftRecord {
    let mut record = DraftRecord::empty();
    record.name = name.to_string();
    record.price = price.to_string();
    record.sku = sku.to_string();
    record.description = format!("{} long description", name);
    record.short_description = format!("{} short", name);
    record
}

/// A store holding exactly `records`, in order. Returns the row ids too.
pub fn store_with(records: Vec<DraftRecord>) -> (SharedRowStore, Vec<String>) {
    let store = SharedRowStore::new(0);
    let ids = store.append_records(records);
    (store, ids)
}
