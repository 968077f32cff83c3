use std::{collections::BTreeSet, fmt};

use entity::{
    Employee, Field, FieldError, NewEmployee, Violation,
    rules::{self, check_all},
};

/// Field values plus which fields the user has already visited.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmployeeForm {
    pub name: String,
    pub email: String,
    pub department: String,
    pub salary: Option<f64>,
    touched: BTreeSet<Field>,
}

impl EmployeeForm {
    /// Overwrites the four editable values; touched state is kept.
    pub fn patch(&mut self, employee: &Employee) {
        self.name = employee.name.clone();
        self.email = employee.email.clone();
        self.department = employee.department.clone();
        self.salary = Some(employee.salary);
    }

    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
    }

    pub fn touch_all(&mut self) {
        self.touched.extend(Field::ALL);
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn error(&self, field: Field) -> Option<Violation> {
        match field {
            Field::Name => rules::check_text(&self.name),
            Field::Email => rules::check_email(&self.email),
            Field::Department => rules::check_text(&self.department),
            Field::Salary => rules::check_salary(self.salary),
        }
    }

    /// Inline feedback: only fields the user has touched report their error.
    pub fn visible_error(&self, field: Field) -> Option<Violation> {
        self.error(field).filter(|_| self.is_touched(field))
    }

    pub fn errors(&self) -> Vec<FieldError> {
        check_all(&self.name, &self.email, &self.department, self.salary)
    }

    pub fn to_new_employee(&self) -> Result<NewEmployee, FormErrors> {
        let errors = self.errors();
        match self.salary {
            Some(salary) if errors.is_empty() => Ok(NewEmployee {
                name: self.name.trim().to_string(),
                email: self.email.clone(),
                department: self.department.trim().to_string(),
                salary,
            }),
            _ => Err(FormErrors(errors)),
        }
    }
}

/// Every rule the form currently breaks, in field order.
#[derive(Clone, Debug, PartialEq)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.iter().map(|err| err.field)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::EmployeeId;

    fn filled() -> EmployeeForm {
        EmployeeForm {
            name: "  Linus ".into(),
            email: "linus@fossrust.test".into(),
            department: "Kernel".into(),
            salary: Some(9000.0),
            ..EmployeeForm::default()
        }
    }

    #[test]
    fn valid_form_builds_trimmed_payload() {
        let draft = filled().to_new_employee().unwrap();
        assert_eq!(draft.name, "Linus");
        assert_eq!(draft.salary, 9000.0);
    }

    #[test]
    fn empty_form_lists_every_field() {
        let errors = EmployeeForm::default().to_new_employee().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), Field::ALL.to_vec());
        assert_eq!(
            errors.to_string(),
            "name is required; email is required; department is required; salary is required"
        );
    }

    #[test]
    fn errors_stay_hidden_until_touched() {
        let mut form = EmployeeForm::default();
        assert_eq!(form.error(Field::Email), Some(Violation::Required));
        assert_eq!(form.visible_error(Field::Email), None);
        form.touch(Field::Email);
        assert_eq!(form.visible_error(Field::Email), Some(Violation::Required));
        assert_eq!(form.visible_error(Field::Name), None);
        form.touch_all();
        assert!(Field::ALL.iter().all(|f| form.is_touched(*f)));
    }

    #[test]
    fn patch_copies_all_editable_fields() {
        let mut form = EmployeeForm::default();
        form.patch(&Employee {
            id: EmployeeId(4),
            name: "Grace".into(),
            email: "grace@nuflights.test".into(),
            department: "Ops".into(),
            salary: 5100.0,
        });
        assert_eq!(form.name, "Grace");
        assert_eq!(form.email, "grace@nuflights.test");
        assert_eq!(form.department, "Ops");
        assert_eq!(form.salary, Some(5100.0));
        assert!(form.errors().is_empty());
    }
}
