//! Data models for the employee manager.
//!
//! The same `Employee` shape travels over the wire, through the controller
//! and into the rendered table.

mod employee;

pub use employee::*;
