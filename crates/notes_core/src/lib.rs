pub mod auth;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use auth::IdentityVerifier;
pub use error::{Error, Result};
pub use models::LanguageModel;
pub use storage::{NoteStore, LIST_LIMIT};
pub use types::{
    AnnotationRequest, Identity, Note, NoteCreate, NoteUpdate, SummaryResult, TodoResult,
};
