use std::{
    collections::HashSet,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use entity::{Employee, EmployeeId, Field, Violation};
use platform_api::{ApiError, EmployeeApi};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    form::{EmployeeForm, FormErrors},
    notify::{Confirm, Notice, Notifier},
};

/// Kinds of backend work; at most one of each kind runs at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Load,
    Fetch,
    Save,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Load => "load",
            Action::Fetch => "fetch",
            Action::Save => "save",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("form is invalid: {0}")]
    Invalid(FormErrors),
    #[error("{0} already in progress")]
    Busy(Action),
    #[error("{action} request failed")]
    Api {
        action: Action,
        #[source]
        source: ApiError,
    },
}

impl HrError {
    fn api(action: Action, source: ApiError) -> Self {
        Self::Api { action, source }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Add,
    Edit(EmployeeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submitted {
    Created,
    Updated(EmployeeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

#[derive(Debug, Default)]
struct ViewState {
    employees: Vec<Employee>,
    form: EmployeeForm,
    mode: FormMode,
}

#[derive(Debug, Default)]
struct Slots {
    active: HashSet<Action>,
    /// Set when a write finished while a load was already running.
    reload_requested: bool,
}

fn lock_slots(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases its action slot when dropped, whichever way the action ended.
struct InFlight<'a> {
    slots: &'a Mutex<Slots>,
    action: Action,
    released: bool,
}

impl InFlight<'_> {
    /// Takes a pending reload request, keeping the slot, or releases the
    /// slot when there is none. Both happen under one lock so a request
    /// made just before release is never lost.
    fn release_unless_reload_requested(&mut self) -> bool {
        let mut slots = lock_slots(self.slots);
        if std::mem::take(&mut slots.reload_requested) {
            return true;
        }
        slots.active.remove(&self.action);
        self.released = true;
        false
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let mut slots = lock_slots(self.slots);
        slots.active.remove(&self.action);
        if self.action == Action::Load {
            slots.reload_requested = false;
        }
    }
}

pub struct EmployeesController<C, N> {
    api: C,
    notifier: N,
    state: Mutex<ViewState>,
    in_flight: Mutex<Slots>,
}

impl<C: EmployeeApi, N: Notifier> EmployeesController<C, N> {
    pub fn new(api: C, notifier: N) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(ViewState::default()),
            in_flight: Mutex::new(Slots::default()),
        }
    }

    pub fn api(&self) -> &C {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, action: Action) -> HrResult<InFlight<'_>> {
        if !lock_slots(&self.in_flight).active.insert(action) {
            warn!(%action, "rejected: already in flight");
            return Err(HrError::Busy(action));
        }
        Ok(self.claimed(action))
    }

    fn claimed(&self, action: Action) -> InFlight<'_> {
        InFlight {
            slots: &self.in_flight,
            action,
            released: false,
        }
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.state().employees.clone()
    }

    pub fn form(&self) -> EmployeeForm {
        self.state().form.clone()
    }

    pub fn mode(&self) -> FormMode {
        self.state().mode
    }

    pub fn is_edit_mode(&self) -> bool {
        matches!(self.mode(), FormMode::Edit(_))
    }

    pub fn selected_id(&self) -> Option<EmployeeId> {
        match self.mode() {
            FormMode::Edit(id) => Some(id),
            FormMode::Add => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        !lock_slots(&self.in_flight).active.is_empty()
    }

    pub fn is_in_flight(&self, action: Action) -> bool {
        lock_slots(&self.in_flight).active.contains(&action)
    }

    pub fn set_name(&self, value: impl Into<String>) {
        self.state().form.name = value.into();
    }

    pub fn set_email(&self, value: impl Into<String>) {
        self.state().form.email = value.into();
    }

    pub fn set_department(&self, value: impl Into<String>) {
        self.state().form.department = value.into();
    }

    pub fn set_salary(&self, value: Option<f64>) {
        self.state().form.salary = value;
    }

    pub fn touch(&self, field: Field) {
        self.state().form.touch(field);
    }

    pub fn field_error(&self, field: Field) -> Option<Violation> {
        self.state().form.error(field)
    }

    pub fn show_error(&self, field: Field) -> bool {
        self.state().form.visible_error(field).is_some()
    }

    /// Replaces the local list with the backend's, in backend order.
    pub async fn load_all(&self) -> HrResult<()> {
        let guard = self.begin(Action::Load)?;
        self.run_load(guard).await
    }

    // Fetches again for as long as writes keep landing during the fetch.
    async fn run_load(&self, mut guard: InFlight<'_>) -> HrResult<()> {
        loop {
            match self.api.list().await {
                Ok(employees) => {
                    info!(count = employees.len(), "employees loaded");
                    self.state().employees = employees;
                }
                Err(err) => {
                    warn!(error = %err, code = err.code(), "loading employees failed");
                    self.notifier
                        .notify(Notice::failure(&err, "Failed to load employees"));
                    return Err(HrError::api(Action::Load, err));
                }
            }
            if !guard.release_unless_reload_requested() {
                return Ok(());
            }
            debug!("write landed during load, fetching again");
        }
    }

    /// Fetches a single record by id without touching the local list.
    pub async fn find(&self, id: EmployeeId) -> HrResult<Employee> {
        let _guard = self.begin(Action::Fetch)?;
        self.api.get(id).await.map_err(|err| {
            warn!(%id, error = %err, "fetching employee failed");
            self.notifier
                .notify(Notice::failure(&err, "Failed to load employee"));
            HrError::api(Action::Fetch, err)
        })
    }

    /// Validates the form, then creates or updates depending on the mode.
    ///
    /// An invalid form marks every field touched and never reaches the backend.
    /// After a successful write the form is reset and the list reloaded.
    pub async fn submit(&self) -> HrResult<Submitted> {
        let (mode, draft) = {
            let mut state = self.state();
            match state.form.to_new_employee() {
                Ok(draft) => (state.mode, draft),
                Err(errors) => {
                    state.form.touch_all();
                    debug!(%errors, "submit blocked by validation");
                    return Err(HrError::Invalid(errors));
                }
            }
        };

        let guard = self.begin(Action::Save)?;
        let result = match mode {
            FormMode::Edit(id) => self
                .api
                .update(id, &Employee::new(id, draft))
                .await
                .map(|()| Submitted::Updated(id)),
            FormMode::Add => self.api.create(&draft).await.map(|()| Submitted::Created),
        };
        drop(guard);

        match result {
            Ok(submitted) => {
                info!(?submitted, "employee saved");
                self.notifier.notify(match submitted {
                    Submitted::Created => Notice::added(),
                    Submitted::Updated(_) => Notice::updated(),
                });
                self.reset_form();
                self.reload().await;
                Ok(submitted)
            }
            Err(err) => {
                warn!(?mode, error = %err, "saving employee failed");
                let fallback = match mode {
                    FormMode::Edit(_) => "Update failed, please refresh",
                    FormMode::Add => "Something went wrong, please refresh",
                };
                self.notifier.notify(Notice::failure(&err, fallback));
                Err(HrError::api(Action::Save, err))
            }
        }
    }

    /// Loads `employee` into the form and switches to edit mode.
    pub fn select_for_edit(&self, employee: &Employee) {
        {
            let mut state = self.state();
            state.form.patch(employee);
            state.mode = FormMode::Edit(employee.id);
        }
        debug!(id = %employee.id, "editing employee");
        self.notifier.scroll_to_top();
    }

    /// Deletes `employee` once the user explicitly confirms.
    pub async fn confirm_delete(&self, employee: &Employee) -> HrResult<DeleteOutcome> {
        let guard = self.begin(Action::Delete)?;
        if !self.notifier.confirm(Confirm::delete(employee)).await {
            debug!(id = %employee.id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let result = self.api.delete(employee.id).await;
        drop(guard);

        match result {
            Ok(()) => {
                info!(id = %employee.id, "employee deleted");
                self.notifier.notify(Notice::deleted());
                self.reload().await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                warn!(id = %employee.id, error = %err, "deleting employee failed");
                self.notifier
                    .notify(Notice::failure(&err, "Delete failed, please refresh"));
                Err(HrError::api(Action::Delete, err))
            }
        }
    }

    pub fn view(&self, employee: &Employee) {
        self.notifier.notify(Notice::details(employee));
    }

    pub fn reset_form(&self) {
        let mut state = self.state();
        state.form = EmployeeForm::default();
        state.mode = FormMode::Add;
    }

    // Runs strictly after a write was acknowledged. A load already in flight
    // may have read the list before the write, so it is asked to fetch once
    // more instead. Failures are reported by run_load and do not undo the write.
    async fn reload(&self) {
        let guard = {
            let mut slots = lock_slots(&self.in_flight);
            if !slots.active.insert(Action::Load) {
                slots.reload_requested = true;
                debug!("load in flight, reload queued behind it");
                return;
            }
            self.claimed(Action::Load)
        };
        if let Err(err) = self.run_load(guard).await {
            debug!(error = %err, "reload after write did not complete");
        }
    }
}
