//! Shift-scheduling core.
//!
//! Provides the domain model, the constraint model builder and solver
//! driver, the result renderer, the persisted schedule state store, and the
//! rule post-validator. The HTTP transport layer (`api`) is a thin
//! collaborator on top of these.

pub mod api;
pub mod config;
pub mod demo_data;
pub mod domain;
pub mod error;
pub mod render;
pub mod solver;
pub mod state_store;
pub mod validator;
pub mod windows;
