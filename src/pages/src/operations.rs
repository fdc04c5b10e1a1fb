//! Farm operations: batches, their activities and sensor readings.

use managers::{form::numeric, Column, Field, ResourceSpec};
use types::{activity::Activity, batch::Batch, reading::Reading, resource::ResourceKind};

pub fn batches() -> ResourceSpec<Batch> {
    let kind = ResourceKind::Batches;
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("name", "Name"),
            Column::new("farm", "Farm").render(|b: &Batch| b.farm.label()),
            Column::new("size", "Size"),
            Column::new("start_date", "Start Date"),
            Column::new("status", "Status"),
        ])
        .fields(vec![
            Field::text("name", "Name").required(),
            Field::text("farm", "Farm ID").required().placeholder("Enter Farm ID"),
            Field::text("size", "Size").required().placeholder("Number of birds"),
            Field::text("start_date", "Start Date (YYYY-MM-DD)").required(),
            Field::text("end_date", "End Date (optional)"),
            Field::text("status", "Status").required(),
        ])
        .normalize_in(numeric(&["farm", "size"], &["end_date"]))
}

pub fn activities() -> ResourceSpec<Activity> {
    let kind = ResourceKind::Activities;
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("date", "Date"),
            Column::new("batch", "Batch").render(|a: &Activity| a.batch.label()),
            Column::new("activity_type", "Type").render(|a: &Activity| a.activity_type.label()),
            Column::new("notes", "Notes"),
        ])
        .fields(vec![
            Field::text("date", "Date (YYYY-MM-DD)").required(),
            Field::text("batch", "Batch ID").required(),
            Field::text("activity_type", "Activity Type ID").required(),
            Field::textarea("notes", "Notes"),
        ])
        .normalize_in(numeric(&["batch", "activity_type"], &[]))
}

pub fn readings() -> ResourceSpec<Reading> {
    let kind = ResourceKind::Readings;
    ResourceSpec::new(kind.title(), kind.endpoint())
        .item(kind.item())
        .columns(vec![
            Column::new("timestamp", "Timestamp"),
            Column::new("device", "Device").render(|r: &Reading| r.device.label()),
            Column::new("sensor_type", "Sensor").render(|r: &Reading| r.sensor_type.label()),
            Column::new("value", "Value"),
        ])
        .fields(vec![
            Field::text("timestamp", "Timestamp (ISO or YYYY-MM-DD HH:MM:SS)").required(),
            Field::text("device", "Device ID").required(),
            Field::text("sensor_type", "Sensor Type ID").required(),
            Field::text("value", "Value").required(),
        ])
        .normalize_in(numeric(&["device", "sensor_type", "value"], &[]))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use api::memory::MemoryBackend;
    use managers::ResourceManager;
    use serde_json::json;
    use types::Ref;

    use super::*;

    #[tokio::test]
    async fn readings_render_sensor_units_and_coerce_values() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(
            "readings/",
            json!({"id": 1, "device": {"id": 4, "name": "Coop sensor"},
                   "sensor_type": {"id": 2, "name": "Temperature", "unit": "°C"},
                   "value": 24.5, "timestamp": "2024-05-01T08:00:00Z"}),
        );
        let manager = ResourceManager::new(readings(), backend.clone());
        manager.refresh().await.unwrap();

        let table = manager.table("°c").await;
        assert_eq!(table.rows[0].cells[2], "Temperature (°C)");

        manager.open_create().await;
        for (name, value) in [
            ("timestamp", "2024-05-01 09:00:00"),
            ("device", "4"),
            ("sensor_type", "2"),
            ("value", "25.25"),
        ] {
            manager.set_field(name, value).await.unwrap();
        }
        manager.submit().await.unwrap();

        let created = manager.row(2).await.unwrap();
        assert_eq!(created.device, Ref::Id(4));
        assert_eq!(created.value, 25.25);
    }

    #[tokio::test]
    async fn activities_use_the_batch_activities_endpoint() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(
            "batch-activities/",
            json!({"id": 1, "batch": 3, "activity_type": {"id": 1, "name": "Vaccination"},
                   "date": "2024-04-02", "notes": "Newcastle"}),
        );
        let manager = ResourceManager::new(activities(), backend);
        manager.refresh().await.unwrap();
        assert_eq!(
            manager.table("vacc").await.rows[0].cells,
            vec!["2024-04-02", "3", "Vaccination", "Newcastle"]
        );
    }

    #[tokio::test]
    async fn null_notes_and_string_values_load() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(
            "batch-activities/",
            json!({"id": 1, "batch": 3, "activity_type": 1, "date": "2024-04-02", "notes": null}),
        );
        backend.insert(
            "readings/",
            json!({"id": 1, "device": 4, "sensor_type": 2, "value": "24.50",
                   "timestamp": "2024-05-01T08:00:00Z"}),
        );

        let activities = ResourceManager::new(activities(), backend.clone());
        activities.refresh().await.unwrap();
        assert_eq!(activities.rows().await[0].notes, "");
        assert_eq!(activities.error().await, None);

        let readings = ResourceManager::new(readings(), backend);
        readings.refresh().await.unwrap();
        assert_eq!(readings.rows().await[0].value, 24.5);
    }
}
