//! kaiwa-core: data model shared by the extractor and the playback engine

pub mod types;
pub mod error;
pub mod bookmark;

pub use error::{Error, Result};
pub use types::{DialogTurn, Role, Suggestion};
pub use bookmark::BookmarkDraft;
