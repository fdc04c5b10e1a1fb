use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub mod activity;
pub mod batch;
pub mod de;
pub mod device;
pub mod farm;
pub mod master;
pub mod reading;
pub mod resource;
pub mod subscription;
pub mod user;

pub type Id = i64;

/// A row the console can list, edit and delete.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> Id;
}

/// Something a `Ref` can point at and show in a table cell.
pub trait Named {
    fn id(&self) -> Id;
    fn label(&self) -> String;
}

/// A relation the backend sends either as a bare foreign key or as the
/// nested object. Resolved once when the row is deserialized.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(Id),
    Expanded(T),
}

impl<T: Named> Ref<T> {
    pub fn id(&self) -> Id {
        match self {
            Ref::Id(id) => *id,
            Ref::Expanded(t) => t.id(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Ref::Id(id) => id.to_string(),
            Ref::Expanded(t) => t.label(),
        }
    }

    pub fn expanded(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Expanded(t) => Some(t),
        }
    }
}

/// Minimal `{id, name}` shape most nested references come with.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NamedRef {
    pub id: Id,
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub name: String,
}

impl Named for NamedRef {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// List endpoints answer with either a bare array or a paginated envelope.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Paged {
        results: Vec<T>,
        #[serde(default)]
        count: Option<usize>,
    },
}

impl<T> ListBody<T> {
    pub fn into_rows(self) -> Vec<T> {
        match self {
            ListBody::Bare(rows) => rows,
            ListBody::Paged { results, .. } => results,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            ListBody::Bare(rows) => rows.len(),
            ListBody::Paged { results, count } => count.unwrap_or(results.len()),
        }
    }
}

/// Error body of the backend, `{"detail": "..."}`.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub detail: Option<String>,
}
