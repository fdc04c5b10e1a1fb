use async_trait::async_trait;
use common::error::ConsoleResult;
use serde_json::Value;
use types::{Id, Record};

use crate::{
    form::Field,
    manager::{ListState, Modal, ResourceManager},
    notify::Notification,
    table::Table,
};

/// A resource screen with its row type erased, so a shell can hold any
/// page behind one pointer.
#[async_trait]
pub trait Screen: Send + Sync {
    fn title(&self) -> &str;
    fn endpoint(&self) -> &str;

    async fn fields(&self) -> Vec<Field>;
    async fn load_lookups(&self);
    async fn refresh(&self) -> ConsoleResult<()>;
    async fn list_state(&self) -> ListState;
    async fn error(&self) -> Option<String>;
    async fn table(&self, query: &str) -> Table;

    async fn open_create(&self);
    async fn open_edit(&self, id: Id) -> ConsoleResult<()>;
    async fn set_field(&self, name: &str, value: Value) -> ConsoleResult<()>;
    async fn modal(&self) -> Modal;
    async fn submit(&self) -> ConsoleResult<()>;

    async fn request_delete(&self, id: Id) -> ConsoleResult<()>;
    async fn confirm_delete(&self) -> ConsoleResult<()>;

    async fn take_notifications(&self) -> Vec<Notification>;
    fn unmount(&self);
}

#[async_trait]
impl<T: Record> Screen for ResourceManager<T> {
    fn title(&self) -> &str {
        &self.spec().title
    }

    fn endpoint(&self) -> &str {
        &self.spec().endpoint
    }

    async fn fields(&self) -> Vec<Field> {
        ResourceManager::fields(self).await
    }

    async fn load_lookups(&self) {
        ResourceManager::load_lookups(self).await
    }

    async fn refresh(&self) -> ConsoleResult<()> {
        ResourceManager::refresh(self).await
    }

    async fn list_state(&self) -> ListState {
        ResourceManager::list_state(self).await
    }

    async fn error(&self) -> Option<String> {
        ResourceManager::error(self).await
    }

    async fn table(&self, query: &str) -> Table {
        ResourceManager::table(self, query).await
    }

    async fn open_create(&self) {
        ResourceManager::open_create(self).await
    }

    async fn open_edit(&self, id: Id) -> ConsoleResult<()> {
        ResourceManager::open_edit(self, id).await
    }

    async fn set_field(&self, name: &str, value: Value) -> ConsoleResult<()> {
        ResourceManager::set_field(self, name, value).await
    }

    async fn modal(&self) -> Modal {
        ResourceManager::modal(self).await
    }

    async fn submit(&self) -> ConsoleResult<()> {
        ResourceManager::submit(self).await
    }

    async fn request_delete(&self, id: Id) -> ConsoleResult<()> {
        ResourceManager::request_delete(self, id).await
    }

    async fn confirm_delete(&self) -> ConsoleResult<()> {
        ResourceManager::confirm_delete(self).await
    }

    async fn take_notifications(&self) -> Vec<Notification> {
        ResourceManager::take_notifications(self).await
    }

    fn unmount(&self) {
        ResourceManager::unmount(self)
    }
}
