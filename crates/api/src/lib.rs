//! Picker collaborator contracts.
//!
//! The state machines depend on these traits and types only: search and filter
//! handlers per namespace, the notification sink, and the invocation error adapter.

#![forbid(unsafe_code)]

pub mod error;
pub mod handler;
pub mod notify;
pub mod presets;

pub use error::{describe_payload, HttpFailure, InvokeError, GENERIC_MESSAGE};
pub use handler::{CatalogSearch, FilterHandler, LibraryFilters, LibrarySearch, SearchHandler};
pub use notify::{report_invoke_error, Level, Notification, NotificationSink, ToastQueue, TracingSink};
pub use presets::{Handlers, Preset, Sources};
