use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use api::{item_path, Backend};
use common::error::{ConsoleError, ConsoleResult};
use futures::future::join_all;
use serde_json::Value;
use tokio::{select, sync::RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use types::{Id, Record};

use crate::{
    form::{check_required, empty_form, form_from_row, Field, FieldKind, FormValues, Normalize},
    lookup::{Lookup, Options},
    notify::Notification,
    table::{cells, matches, Column, Table, TableRow},
};

/// Everything a page tells the manager about its resource.
pub struct ResourceSpec<T> {
    pub title: String,
    pub item: String,
    pub endpoint: String,
    pub columns: Vec<Column<T>>,
    pub fields: Vec<Field>,
    pub normalize_in: Option<Normalize>,
    /// Reshapes a row before it pre-fills the edit form.
    pub prefill: Option<Prefill>,
    pub lookups: Vec<Lookup>,
}

pub type Prefill = Arc<dyn Fn(Value) -> Value + Send + Sync>;

impl<T> ResourceSpec<T> {
    pub fn new(title: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            item: title.clone(),
            title,
            endpoint: endpoint.into(),
            columns: vec![],
            fields: vec![],
            normalize_in: None,
            prefill: None,
            lookups: vec![],
        }
    }

    /// Singular name used in toasts ("Device created successfully").
    pub fn item(mut self, item: impl Into<String>) -> Self {
        self.item = item.into();
        self
    }

    pub fn columns(mut self, columns: Vec<Column<T>>) -> Self {
        self.columns = columns;
        self
    }

    pub fn fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn normalize_in(mut self, normalize: Normalize) -> Self {
        self.normalize_in = Some(normalize);
        self
    }

    pub fn prefill(mut self, prefill: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.prefill = Some(Arc::new(prefill));
        self
    }

    pub fn lookups(mut self, lookups: Vec<Lookup>) -> Self {
        self.lookups = lookups;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Closed,
    Create(FormValues),
    Edit { id: Id, values: FormValues },
}

impl Modal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }

    pub fn values(&self) -> Option<&FormValues> {
        match self {
            Modal::Closed => None,
            Modal::Create(values) | Modal::Edit { values, .. } => Some(values),
        }
    }
}

struct State<T> {
    fields: Vec<Field>,
    list: ListState,
    rows: Vec<T>,
    banner: Option<String>,
    modal: Modal,
    delete_target: Option<Id>,
    submitting: bool,
    notifications: Vec<Notification>,
}

/// Searchable table plus create/edit/delete modals over one collection
/// endpoint.
///
/// Refetches are sequenced: each takes a ticket and only the holder of the
/// latest ticket may replace the rows, so a slow older response never
/// overwrites a newer one. After [`ResourceManager::unmount`] in-flight
/// requests are dropped and nothing touches the state anymore.
pub struct ResourceManager<T> {
    spec: ResourceSpec<T>,
    backend: Arc<dyn Backend>,
    state: RwLock<State<T>>,
    ticket: AtomicU64,
    cancel: CancellationToken,
}

impl<T: Record> ResourceManager<T> {
    pub fn new(spec: ResourceSpec<T>, backend: Arc<dyn Backend>) -> Self {
        Self {
            state: RwLock::new(State {
                fields: spec.fields.clone(),
                list: ListState::Idle,
                rows: vec![],
                banner: None,
                modal: Modal::Closed,
                delete_target: None,
                submitting: false,
                notifications: vec![],
            }),
            spec,
            backend,
            ticket: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    pub fn spec(&self) -> &ResourceSpec<T> {
        &self.spec
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    fn ensure_mounted(&self) -> ConsoleResult<()> {
        if self.cancel.is_cancelled() {
            Err(ConsoleError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Runs a backend call unless the view goes away first.
    async fn guarded<R>(
        &self,
        fut: impl std::future::Future<Output = ConsoleResult<R>>,
    ) -> ConsoleResult<R> {
        select! {
            _ = self.cancel.cancelled() => Err(ConsoleError::Cancelled),
            r = fut => r,
        }
    }

    async fn notify(&self, notification: Notification) {
        self.state.write().await.notifications.push(notification);
    }

    /// Error toast text: the server's detail when it sent one.
    fn failure_message(&self, e: &ConsoleError, fallback: String) -> String {
        match e {
            ConsoleError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            e if e.is_form_error() => e.to_string(),
            _ => fallback,
        }
    }

    /// `GET endpoint`; called on mount and after every mutation.
    pub async fn refresh(&self) -> ConsoleResult<()> {
        self.ensure_mounted()?;
        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.list = ListState::Loading;

        let result = self
            .guarded(api::list::<T>(self.backend.as_ref(), &self.spec.endpoint))
            .await;

        if self.cancel.is_cancelled() {
            return Err(ConsoleError::Cancelled);
        }
        let mut state = self.state.write().await;
        if ticket != self.ticket.load(Ordering::SeqCst) {
            debug!("{}: dropping stale response #{}", self.spec.endpoint, ticket);
            return Ok(());
        }

        match result {
            Ok(rows) => {
                state.rows = rows;
                state.list = ListState::Loaded;
                state.banner = None;
                Ok(())
            }
            Err(e) => {
                warn!("fetch {} failed: {}", self.spec.endpoint, e);
                state.rows.clear();
                state.list = ListState::Errored;
                state.banner = Some(format!(
                    "Failed to fetch {}. Please try again.",
                    self.spec.title.to_lowercase()
                ));
                let message = self.failure_message(
                    &e,
                    format!("Failed to fetch {}", self.spec.title.to_lowercase()),
                );
                state.notifications.push(Notification::error(message));
                Err(e)
            }
        }
    }

    pub async fn list_state(&self) -> ListState {
        self.state.read().await.list
    }

    pub async fn rows(&self) -> Vec<T> {
        self.state.read().await.rows.clone()
    }

    pub async fn row(&self, id: Id) -> Option<T> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .find(|row| row.id() == id)
            .cloned()
    }

    /// Error banner left by a failed fetch.
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.banner.clone()
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.banner = None;
    }

    pub fn cells(&self, row: &T) -> Vec<String> {
        cells(&self.spec.columns, row)
    }

    /// Rows with at least one column containing `query`.
    pub async fn visible_rows(&self, query: &str) -> Vec<T> {
        self.filtered(query, |_| true).await
    }

    /// Search plus a page-specific predicate.
    pub async fn filtered(&self, query: &str, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .filter(|&row| keep(row) && matches(query, &self.cells(row)))
            .cloned()
            .collect()
    }

    pub fn table_of(&self, rows: &[T]) -> Table {
        Table {
            headers: self
                .spec
                .columns
                .iter()
                .map(|c| c.header.to_owned())
                .collect(),
            rows: rows
                .iter()
                .map(|row| TableRow {
                    id: row.id(),
                    cells: self.cells(row),
                })
                .collect(),
        }
    }

    pub async fn table(&self, query: &str) -> Table {
        let rows = self.visible_rows(query).await;
        self.table_of(&rows)
    }

    /// Form fields as they are now; lookups may have turned id inputs
    /// into selects.
    pub async fn fields(&self) -> Vec<Field> {
        self.state.read().await.fields.clone()
    }

    /// Turns `name` into a select over `options`.
    pub async fn set_options(&self, name: &str, options: Options) {
        let mut state = self.state.write().await;
        if let Some(field) = state.fields.iter_mut().find(|f| f.name == name) {
            field.kind = FieldKind::Select(options);
        }
    }

    /// Fetches the options of every lookup concurrently. A field whose
    /// lookup fails or comes back empty stays an id input.
    pub async fn load_lookups(&self) {
        let loads = self.spec.lookups.iter().map(|lookup| async move {
            let result = self.guarded(lookup.load(self.backend.clone())).await;
            (lookup, result)
        });
        for (lookup, result) in join_all(loads).await {
            match result {
                Ok(options) if !options.is_empty() => {
                    self.set_options(lookup.field, options).await
                }
                Ok(_) => debug!("{}: {} is empty", self.spec.endpoint, lookup.endpoint),
                Err(e) => warn!(
                    "{}: loading {} options from {} failed: {}",
                    self.spec.endpoint, lookup.field, lookup.endpoint, e
                ),
            }
        }
    }

    pub async fn modal(&self) -> Modal {
        self.state.read().await.modal.clone()
    }

    pub async fn open_create(&self) {
        let mut state = self.state.write().await;
        let values = empty_form(&state.fields);
        state.modal = Modal::Create(values);
    }

    pub async fn open_edit(&self, id: Id) -> ConsoleResult<()> {
        let mut state = self.state.write().await;
        let row = state
            .rows
            .iter()
            .find(|row| row.id() == id)
            .ok_or_else(|| ConsoleError::NotFound(self.spec.item.clone(), id))?;
        let mut source = serde_json::to_value(row)?;
        if let Some(prefill) = &self.spec.prefill {
            source = prefill(source);
        }
        let values = form_from_row(&state.fields, &source);
        state.modal = Modal::Edit { id, values };
        Ok(())
    }

    pub async fn set_field(&self, name: &str, value: impl Into<Value>) -> ConsoleResult<()> {
        let mut state = self.state.write().await;
        match &mut state.modal {
            Modal::Closed => Err(ConsoleError::Common("no form is open".to_owned())),
            Modal::Create(values) | Modal::Edit { values, .. } => {
                values.insert(name.to_owned(), value.into());
                Ok(())
            }
        }
    }

    pub async fn close_modal(&self) {
        self.state.write().await.modal = Modal::Closed;
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.read().await.submitting
    }

    /// Creates or updates depending on the open form. The form stays open
    /// on failure.
    pub async fn submit(&self) -> ConsoleResult<()> {
        self.ensure_mounted()?;
        let (modal, fields) = {
            let state = self.state.read().await;
            (state.modal.clone(), state.fields.clone())
        };
        let (id, values) = match modal {
            Modal::Closed => return Err(ConsoleError::Common("no form is open".to_owned())),
            Modal::Create(values) => (None, values),
            Modal::Edit { id, values } => (Some(id), values),
        };

        let prepared = check_required(&fields, &values).and_then(|_| {
            match &self.spec.normalize_in {
                Some(normalize) => normalize(values),
                None => Ok(values),
            }
        });
        let values = match prepared {
            Ok(values) => values,
            Err(e) => {
                self.notify(Notification::error(e.to_string())).await;
                return Err(e);
            }
        };

        self.state.write().await.submitting = true;
        let body = Value::Object(values);
        let result = match id {
            None => {
                self.guarded(self.backend.post(&self.spec.endpoint, body))
                    .await
            }
            Some(id) => {
                self.guarded(self.backend.put(&item_path(&self.spec.endpoint, id), body))
                    .await
            }
        };
        if self.cancel.is_cancelled() {
            return Err(ConsoleError::Cancelled);
        }
        self.state.write().await.submitting = false;

        match result {
            Ok(_) => {
                let verb = if id.is_some() { "updated" } else { "created" };
                {
                    let mut state = self.state.write().await;
                    state.modal = Modal::Closed;
                    state.notifications.push(Notification::success(format!(
                        "{} {} successfully",
                        self.spec.item, verb
                    )));
                }
                // list failures are already surfaced as banner and toast
                let _ = self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!("save {} failed: {}", self.spec.item, e);
                let message = self.failure_message(
                    &e,
                    format!("Failed to save {}", self.spec.item.to_lowercase()),
                );
                self.notify(Notification::error(message)).await;
                Err(e)
            }
        }
    }

    pub async fn request_delete(&self, id: Id) -> ConsoleResult<()> {
        let mut state = self.state.write().await;
        if !state.rows.iter().any(|row| row.id() == id) {
            return Err(ConsoleError::NotFound(self.spec.item.clone(), id));
        }
        state.delete_target = Some(id);
        Ok(())
    }

    pub async fn delete_target(&self) -> Option<Id> {
        self.state.read().await.delete_target
    }

    pub async fn cancel_delete(&self) {
        self.state.write().await.delete_target = None;
    }

    /// `DELETE endpoint/{id}/` for the row awaiting confirmation.
    pub async fn confirm_delete(&self) -> ConsoleResult<()> {
        self.ensure_mounted()?;
        let id = self
            .state
            .read()
            .await
            .delete_target
            .ok_or_else(|| ConsoleError::Common("nothing to delete".to_owned()))?;

        let result = self
            .guarded(self.backend.delete(&item_path(&self.spec.endpoint, id)))
            .await;
        if self.cancel.is_cancelled() {
            return Err(ConsoleError::Cancelled);
        }

        match result {
            Ok(()) => {
                {
                    let mut state = self.state.write().await;
                    state.delete_target = None;
                    state.notifications.push(Notification::success(format!(
                        "{} deleted successfully",
                        self.spec.item
                    )));
                }
                let _ = self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!("delete {} {} failed: {}", self.spec.item, id, e);
                let message = self.failure_message(
                    &e,
                    format!("Failed to delete {}", self.spec.item.to_lowercase()),
                );
                self.notify(Notification::error(message)).await;
                Err(e)
            }
        }
    }

    /// Partial update of one row, e.g. a status toggle.
    pub async fn patch(&self, id: Id, body: Value) -> ConsoleResult<()> {
        let endpoint = self.spec.endpoint.clone();
        self.patch_at(&endpoint, id, body).await
    }

    /// Like [`ResourceManager::patch`] but against another collection path.
    pub async fn patch_at(&self, endpoint: &str, id: Id, body: Value) -> ConsoleResult<()> {
        let done = format!("{} updated successfully", self.spec.item);
        let failed = format!("Failed to update {}", self.spec.item.to_lowercase());
        self.patch_with(endpoint, id, body, done, failed).await
    }

    /// `PATCH {status}` on one row, toasting "Device inactive successfully".
    pub async fn set_status(&self, endpoint: &str, id: Id, status: &str) -> ConsoleResult<()> {
        let done = format!("{} {} successfully", self.spec.item, status.to_lowercase());
        let failed = format!("Failed to update {} status", self.spec.item.to_lowercase());
        self.patch_with(endpoint, id, serde_json::json!({ "status": status }), done, failed)
            .await
    }

    async fn patch_with(
        &self,
        endpoint: &str,
        id: Id,
        body: Value,
        done: String,
        failed: String,
    ) -> ConsoleResult<()> {
        self.ensure_mounted()?;
        let result = self
            .guarded(self.backend.patch(&item_path(endpoint, id), body))
            .await;
        if self.cancel.is_cancelled() {
            return Err(ConsoleError::Cancelled);
        }

        match result {
            Ok(_) => {
                self.notify(Notification::success(done)).await;
                let _ = self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!("patch {} {} failed: {}", endpoint, id, e);
                let message = self.failure_message(&e, failed);
                self.notify(Notification::error(message)).await;
                Err(e)
            }
        }
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }

    /// Hands the pending toasts to the caller and forgets them.
    pub async fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.state.write().await.notifications)
    }

    /// The view is gone: cancel in-flight requests and ignore their results.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}
