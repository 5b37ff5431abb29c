//! Core types and trait definitions for the Secret Santa allocator.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::SantaStore`]; the HTTP layer drives
//! [`service::SecretSanta`].

pub mod allocator;
pub mod assignment;
pub mod credential;
pub mod error;
pub mod person;
pub mod service;
pub mod store;

pub use error::{Error, Mismatch, Result};
