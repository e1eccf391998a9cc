//! Container lifecycle management for the SSH gateway — the Container
//! Controller component.

pub mod controller;
pub mod error;

pub use controller::{ContainerController, ContainerHandle, ExecHandle};
pub use error::{ContainerError, Result};
