//! Parametric geometry kernel for laser-cut, finger-jointed boxes.
//!
//! The design lives in a [`tree::Scene`] that only the [`Engine`] mutates.
//! Panels are never stored: [`operations::projection::project`] derives them
//! from the tree, and [`validation`] checks the derived set.

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod tree;
pub mod validation;

pub use config::KernelConfig;
pub use engine::{Action, DispatchOptions, Engine, Snapshot};
pub use error::{BoxcutError, Result};
