//! Select options that come from another collection, e.g. the farms a
//! device can belong to.

use std::sync::Arc;

use api::Backend;
use common::error::ConsoleResult;
use futures::{future::BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use types::Named;

/// (value, label) pairs of a select.
pub type Options = Vec<(String, String)>;

type Load =
    Arc<dyn Fn(Arc<dyn Backend>) -> BoxFuture<'static, ConsoleResult<Options>> + Send + Sync>;

/// Fills the `field` select with the rows of `endpoint`, labelled by
/// [`Named::label`] and submitted by id.
#[derive(Clone)]
pub struct Lookup {
    pub field: &'static str,
    pub endpoint: &'static str,
    load: Load,
}

impl Lookup {
    pub fn of<T>(field: &'static str, endpoint: &'static str) -> Self
    where
        T: Named + DeserializeOwned + Send + 'static,
    {
        let load: Load = Arc::new(move |backend: Arc<dyn Backend>| {
            async move {
                let rows: Vec<T> = api::list(backend.as_ref(), endpoint).await?;
                Ok(rows
                    .iter()
                    .map(|row| (row.id().to_string(), row.label()))
                    .collect())
            }
            .boxed()
        });
        Self {
            field,
            endpoint,
            load,
        }
    }

    pub async fn load(&self, backend: Arc<dyn Backend>) -> ConsoleResult<Options> {
        (self.load)(backend).await
    }
}
