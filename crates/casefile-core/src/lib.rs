//! Core types and trait definitions for the casefile document repository.
//!
//! This crate is deliberately free of database dependencies. Storage
//! backends implement the traits in [`store`]; callers use
//! [`repository::Repository`].

pub mod cancel;
pub mod citizenship;
pub mod document;
pub mod error;
pub mod inquiry;
pub mod mapper;
pub mod record;
pub mod registry;
pub mod repository;
pub mod store;
pub mod survivor;

pub use cancel::CancellationToken;
pub use error::{Error, Result};
pub use repository::{DocumentStream, Repository, RepositoryBuilder};
