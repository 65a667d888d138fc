//! Mock implementations and test utilities for the task service
//!
//! This crate provides comprehensive testing infrastructure including:
//! - Mock implementations of the connection provider and the task store
//! - Realistic test data generators
//! - Custom assertion helpers
//! - Property-based testing strategies
//! - Contract test helpers

pub mod assertions;
pub mod builders;
pub mod connection;
pub mod contracts;
pub mod fixtures;
pub mod generators;
pub mod store;

pub use assertions::*;
pub use builders::*;
pub use connection::{MockConnectionProvider, MockHandle};
pub use contracts::*;
pub use fixtures::*;
pub use generators::*;
pub use store::MockTaskStore;
