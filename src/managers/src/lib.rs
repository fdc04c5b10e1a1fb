//! Generic list/detail/edit screens over REST collections.

pub mod form;
pub mod lookup;
pub mod manager;
pub mod notify;
pub mod screen;
pub mod table;

pub use form::{Field, FieldKind, FormValues, Normalize};
pub use lookup::{Lookup, Options};
pub use manager::{ListState, Modal, Prefill, ResourceManager, ResourceSpec};
pub use notify::{Level, Notification};
pub use screen::Screen;
pub use table::{Column, Table, TableRow};
