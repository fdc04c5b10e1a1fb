//! Lookup tables: every one is a name plus an optional description.

use managers::{Column, Field, ResourceSpec};
use types::{master::MasterRecord, resource::ResourceKind};

pub fn master_data(kind: ResourceKind) -> ResourceSpec<MasterRecord> {
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("name", "Name"),
            Column::new("description", "Description"),
        ])
        .fields(vec![
            Field::text("name", "Name").required(),
            Field::textarea("description", "Description"),
        ])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use api::memory::MemoryBackend;
    use managers::ResourceManager;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn edit_replaces_description() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(
            "breeds/",
            json!({"id": 1, "name": "Kuroiler", "description": null, "breed_type": 2}),
        );
        let manager = ResourceManager::new(master_data(ResourceKind::Breeds), backend.clone());
        manager.refresh().await.unwrap();
        assert_eq!(manager.table("kuro").await.rows[0].cells, vec!["Kuroiler", ""]);

        manager.open_edit(1).await.unwrap();
        manager.set_field("description", "Dual purpose").await.unwrap();
        manager.submit().await.unwrap();
        assert_eq!(
            manager.row(1).await.unwrap().description.as_deref(),
            Some("Dual purpose")
        );
        assert_eq!(
            manager.take_notifications().await.last().unwrap().description,
            "Breed updated successfully"
        );
    }
}
