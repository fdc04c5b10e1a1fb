//! One screen per admin resource, plus the sidebar and the dashboard.

use std::sync::Arc;

use api::Backend;
use managers::{ResourceManager, ResourceSpec, Screen};
use types::{resource::ResourceKind, Record};

pub mod dashboard;
pub mod devices;
pub mod master;
pub mod operations;
pub mod people;
pub mod sidebar;
pub mod subscriptions;

fn mount<T: Record>(spec: ResourceSpec<T>, backend: Arc<dyn Backend>) -> Arc<dyn Screen> {
    Arc::new(ResourceManager::new(spec, backend))
}

/// The generic screen of `kind`. Devices and subscriptions also have
/// richer pages in [`devices`] and [`subscriptions`].
pub fn screen_for(kind: ResourceKind, backend: Arc<dyn Backend>) -> Arc<dyn Screen> {
    match kind {
        ResourceKind::Users => mount(people::users(), backend),
        ResourceKind::Farmers => mount(people::farmers(), backend),
        ResourceKind::Farms => mount(people::farms(), backend),
        ResourceKind::Devices => mount(devices::spec(), backend),
        ResourceKind::Batches => mount(operations::batches(), backend),
        ResourceKind::Activities => mount(operations::activities(), backend),
        ResourceKind::Readings => mount(operations::readings(), backend),
        ResourceKind::Subscriptions => mount(subscriptions::spec(), backend),
        kind => mount(master::master_data(kind), backend),
    }
}
