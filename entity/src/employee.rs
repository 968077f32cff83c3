use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::rules::{self, FieldError};

/// Server-assigned employee identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for EmployeeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for EmployeeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub department: String,
    pub salary: f64,
}

impl Employee {
    pub fn new(id: EmployeeId, draft: NewEmployee) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            department: draft.department,
            salary: draft.salary,
        }
    }

    /// The editable part of the record, without the id.
    pub fn draft(&self) -> NewEmployee {
        NewEmployee {
            name: self.name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
            salary: self.salary,
        }
    }
}

/// Create payload: an employee before the backend has assigned an id.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub department: String,
    pub salary: f64,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors = rules::check_all(&self.name, &self.email, &self.department, Some(self.salary));
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Field;
    use serde_json::json;

    #[test]
    fn decodes_backend_payload() {
        let raw = json!([
            {"id": 1, "name": "A", "email": "a@x.com", "department": "Eng", "salary": 100}
        ]);
        let list: Vec<Employee> = serde_json::from_value(raw).unwrap();
        assert_eq!(
            list,
            vec![Employee {
                id: EmployeeId(1),
                name: "A".into(),
                email: "a@x.com".into(),
                department: "Eng".into(),
                salary: 100.0,
            }]
        );
    }

    #[test]
    fn create_payload_has_no_id() {
        let draft = NewEmployee {
            name: "Ada".into(),
            email: "ada@acme.test".into(),
            department: "R&D".into(),
            salary: 4200.5,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["salary"], json!(4200.5));
    }

    #[test]
    fn id_parses_from_cli_text() {
        assert_eq!(" 42 ".parse::<EmployeeId>().unwrap(), EmployeeId(42));
        assert!("abc".parse::<EmployeeId>().is_err());
    }

    #[test]
    fn validate_reports_every_broken_field() {
        let draft = NewEmployee {
            name: " ".into(),
            email: "nope".into(),
            department: "Ops".into(),
            salary: 0.0,
        };
        let errors = draft.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::Name, Field::Email, Field::Salary]);
    }
}
