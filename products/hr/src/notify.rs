//! Notification capability the controller reports through.

use std::{
    future::Future,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use entity::Employee;
use platform_api::ApiError;

pub const CURRENCY_SYMBOL: &str = "₹";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NoticeBody {
    Text(String),
    /// Labelled read-only lines, in display order.
    Details(Vec<(&'static str, String)>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: Level,
    pub title: String,
    pub body: NoticeBody,
}

impl Notice {
    pub fn text(level: Level, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            body: NoticeBody::Text(body.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self::text(
            Level::Warning,
            "API Not Available",
            "Backend service is not running. Please start the API.",
        )
    }

    pub fn added() -> Self {
        Self::text(Level::Success, "Added", "Employee added successfully")
    }

    pub fn updated() -> Self {
        Self::text(Level::Success, "Updated", "Employee updated successfully")
    }

    pub fn deleted() -> Self {
        Self::text(Level::Success, "Deleted", "Employee deleted successfully")
    }

    /// Picks the unreachable-backend notice over `fallback` for connection failures.
    pub fn failure(err: &ApiError, fallback: &str) -> Self {
        if err.is_unavailable() {
            Self::unavailable()
        } else {
            Self::text(Level::Error, "Error", fallback)
        }
    }

    pub fn details(employee: &Employee) -> Self {
        Self {
            level: Level::Info,
            title: "Employee Details".into(),
            body: NoticeBody::Details(vec![
                ("Id", employee.id.to_string()),
                ("Name", employee.name.clone()),
                ("Email", employee.email.clone()),
                ("Department", employee.department.clone()),
                ("Salary", format!("{CURRENCY_SYMBOL} {}", employee.salary)),
            ]),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.body {
            NoticeBody::Text(text) => Some(text),
            NoticeBody::Details(_) => None,
        }
    }
}

/// A yes/no question the user must answer explicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct Confirm {
    pub title: String,
    pub text: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Confirm {
    pub fn delete(employee: &Employee) -> Self {
        Self {
            title: "Are you sure?".into(),
            text: format!("Delete employee \"{}\"?", employee.name),
            confirm_label: "Yes, delete it".into(),
            cancel_label: "Cancel".into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    /// Resolves `true` only when the user explicitly confirmed.
    fn confirm(&self, prompt: Confirm) -> impl Future<Output = bool> + Send;

    fn scroll_to_top(&self) {}
}

/// Discards notices and declines every confirmation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notice: Notice) {}

    async fn confirm(&self, _prompt: Confirm) -> bool {
        false
    }
}

/// Keeps everything it is asked to show; answers confirmations with a preset.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    answer: bool,
    notices: Mutex<Vec<Notice>>,
    prompts: Mutex<Vec<Confirm>>,
    scrolls: AtomicUsize,
}

impl RecordingNotifier {
    pub fn confirming() -> Self {
        Self {
            answer: true,
            ..Self::default()
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn prompts(&self) -> Vec<Confirm> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }

    async fn confirm(&self, prompt: Confirm) -> bool {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt);
        self.answer
    }

    fn scroll_to_top(&self) {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
    }
}
