use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use entity::{Employee, EmployeeId, NewEmployee};

#[derive(Debug, Default)]
struct Rows {
    by_id: BTreeMap<EmployeeId, Employee>,
    last_id: i64,
}

/// Shared in-memory employee table. Ids are assigned sequentially from 1 and
/// never reused.
#[derive(Clone, Debug, Default)]
pub struct EmployeeStore {
    rows: Arc<RwLock<Rows>>,
}

impl EmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let store = Self::new();
        for draft in demo_employees() {
            store.insert(draft);
        }
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Rows> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Rows> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// All rows ordered by id.
    pub fn list(&self) -> Vec<Employee> {
        self.read().by_id.values().cloned().collect()
    }

    pub fn get(&self, id: EmployeeId) -> Option<Employee> {
        self.read().by_id.get(&id).cloned()
    }

    pub fn insert(&self, draft: NewEmployee) -> Employee {
        let mut rows = self.write();
        rows.last_id += 1;
        let employee = Employee::new(EmployeeId(rows.last_id), draft);
        rows.by_id.insert(employee.id, employee.clone());
        employee
    }

    /// Replaces an existing row; `None` when the id is unknown.
    pub fn replace(&self, employee: Employee) -> Option<Employee> {
        let mut rows = self.write();
        let slot = rows.by_id.get_mut(&employee.id)?;
        *slot = employee.clone();
        Some(employee)
    }

    pub fn remove(&self, id: EmployeeId) -> bool {
        self.write().by_id.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn demo_employees() -> Vec<NewEmployee> {
    [
        ("Ada Lovelace", "ada@acme.test", "Engineering", 8200.0),
        ("Charles Babbage", "charles@acme.test", "Engineering", 7900.0),
        ("Grace Hopper", "grace@nuflights.test", "Operations", 8800.0),
        ("Linus Torvalds", "linus@fossrust.test", "Platform", 9100.0),
    ]
    .into_iter()
    .map(|(name, email, department, salary)| NewEmployee {
        name: name.into(),
        email: email.into(),
        department: department.into(),
        salary,
    })
    .collect()
}
