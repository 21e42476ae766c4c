//! Core types and the identity-resolution pipeline for Linkage.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`repository::ContactRepository`] (the synchronous,
//! in-transaction view the pipeline runs against) and [`store::IdentityStore`]
//! (the async surface the transport layer calls).

pub mod contact;
pub mod error;
pub mod identity;
pub mod lock;
pub mod pipeline;
pub mod repository;
pub mod store;

pub use error::{Error, ErrorKind, Result};
