//! Employee domain types shared by the client, the controller and the
//! reference backend.

pub mod employee;
pub mod rules;

pub use employee::{Employee, EmployeeId, NewEmployee};
pub use rules::{Field, FieldError, Violation};
