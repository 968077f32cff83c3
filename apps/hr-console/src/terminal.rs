//! Plain-text rendering of notices, prompts and the employee table.

use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use entity::{Employee, Field, FieldError};
use products_hr::{Confirm, Level, Notice, NoticeBody, Notifier};
use tracing::warn;

pub struct TerminalNotifier<W> {
    out: Mutex<W>,
    auto_confirm: bool,
}

impl TerminalNotifier<io::Stdout> {
    pub fn stdout(auto_confirm: bool) -> Self {
        Self::new(io::stdout(), auto_confirm)
    }
}

impl<W: Write + Send> TerminalNotifier<W> {
    pub fn new(out: W, auto_confirm: bool) -> Self {
        Self {
            out: Mutex::new(out),
            auto_confirm,
        }
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            warn!(error = %err, "failed to write to terminal");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn notify(&self, notice: Notice) {
        self.write(&render_notice(&notice));
    }

    async fn confirm(&self, prompt: Confirm) -> bool {
        self.write(&render_prompt(&prompt));
        if self.auto_confirm {
            self.write("y (--yes)\n");
            return true;
        }
        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            io::stdin().read_line(&mut line).map(|_| line)
        })
        .await;
        match line {
            Ok(Ok(line)) => is_yes(&line),
            Ok(Err(err)) => {
                warn!(error = %err, "could not read confirmation");
                false
            }
            Err(err) => {
                warn!(error = %err, "confirmation reader panicked");
                false
            }
        }
    }
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Success => "ok",
        Level::Info => "info",
        Level::Warning => "warn",
        Level::Error => "error",
    }
}

pub fn render_notice(notice: &Notice) -> String {
    let mut text = format!("[{}] {}\n", level_tag(notice.level), notice.title);
    match &notice.body {
        NoticeBody::Text(body) => {
            text.push_str("    ");
            text.push_str(body);
            text.push('\n');
        }
        NoticeBody::Details(lines) => {
            let width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
            for (label, value) in lines {
                text.push_str(&format!("    {:<width$} {value}\n", format!("{label}:")));
            }
        }
    }
    text
}

pub fn render_prompt(prompt: &Confirm) -> String {
    format!(
        "{} {} [y = {} / N = {}]: ",
        prompt.title, prompt.text, prompt.confirm_label, prompt.cancel_label
    )
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Inline field feedback, one line per broken field.
pub fn render_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|err| format!("  {:<14} {}\n", flag_for(err.field), err.violation))
        .collect()
}

pub fn render_table(employees: &[Employee]) -> String {
    if employees.is_empty() {
        return "No employees found.\n".into();
    }
    let header = ["Id", "Name", "Email", "Department", "Salary"];
    let rows: Vec<[String; 5]> = employees
        .iter()
        .map(|e| {
            [
                e.id.to_string(),
                e.name.clone(),
                e.email.clone(),
                e.department.clone(),
                format!("{:.2}", e.salary),
            ]
        })
        .collect();
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (cell, width))| {
            // Id and salary columns are right-aligned.
            if idx == 0 || idx == 4 {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Field name as typed on the command line.
fn flag_for(field: Field) -> String {
    format!("--{}", field.as_str())
}
