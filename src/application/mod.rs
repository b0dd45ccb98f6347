// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Boundary between the HTTP host and the services
// - Transfer objects, entity -> DTO mapping, the result envelope
// - The error taxonomy callers see (ServiceError / ErrorKind)
// - Never touches storage directly

pub mod dto;
pub mod error_handling;
pub mod mapping;
pub mod response;
pub mod state;

pub use dto::*;
pub use error_handling::{ErrorKind, Failure, ServiceError};
pub use response::{ApiResponse, PagedResponse, INTERNAL_ERROR_DETAIL};
pub use state::AppState;
