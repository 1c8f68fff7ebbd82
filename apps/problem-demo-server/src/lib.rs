//! Demo service that throws exceptions from its handlers and renders them as problem details.

pub mod errors;
pub mod web;

pub use web::{router, AppState};
