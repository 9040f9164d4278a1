//! Procura Core — domain models, error taxonomy and the repository
//! traits the approval workflow is written against.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{ProcuraError, ProcuraResult};
