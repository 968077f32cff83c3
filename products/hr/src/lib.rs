//! HR vertical slice: the employee directory controller.
//!
//! The controller owns the list, the form and the in-flight guards, talks to
//! the backend through [`platform_api::EmployeeApi`] and reports every outcome
//! through a [`Notifier`], so the same logic runs behind a terminal, a test
//! harness or nothing at all.

mod controller;
mod form;
pub mod notify;

pub use controller::{
    Action, DeleteOutcome, EmployeesController, FormMode, HrError, HrResult, Submitted,
};
pub use form::{EmployeeForm, FormErrors};
pub use notify::{
    Confirm, Level, Notice, NoticeBody, Notifier, RecordingNotifier, SilentNotifier,
};
