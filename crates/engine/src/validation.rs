//! Form-level checks run on create/update payloads before they are sent.

use api_types::{
    Amount, budget::BudgetNew, category::CategoryNew, client::ClientNew, expense::ExpenseNew,
    goal::GoalNew, goal::STATUSES, income::IncomeNew, project::ProjectNew,
};
use chrono::NaiveDate;

use crate::ValidationError;

const NOTE_MAX_CHARS: usize = 250;
const GOAL_NAME_MAX_CHARS: usize = 150;
const NAME_MAX_CHARS: usize = 100;

/// A payload that can be checked before submission.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Zero-padded form only: `2024-3-1` is rejected.
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn check_date(errors: &mut ValidationError, field: &'static str, raw: &str) -> Option<NaiveDate> {
    let parsed = parse_date(raw);
    if parsed.is_none() {
        errors.push(field, "Please select a date.");
    }
    parsed
}

fn check_positive_amount(errors: &mut ValidationError, field: &'static str, amount: &Amount) {
    match amount.as_f64() {
        Some(value) if value > 0.0 => {}
        _ => errors.push(field, "Amount must be greater than 0."),
    }
}

fn check_note(errors: &mut ValidationError, note: Option<&str>) {
    if note.is_some_and(|note| note.chars().count() > NOTE_MAX_CHARS) {
        errors.push("note", "Note must be 250 characters or less.");
    }
}

fn check_reference(errors: &mut ValidationError, field: &'static str, id: i64, label: &str) {
    if id <= 0 {
        errors.push(field, format!("Please select a {label}."));
    }
}

fn check_name(errors: &mut ValidationError, name: &str, max: usize, label: &str) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.push("name", format!("Please enter a {label} name."));
    } else if trimmed.chars().count() > max {
        errors.push("name", format!("Name must be {max} characters or less."));
    }
}

fn is_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || raw.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

impl Validate for ExpenseNew {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_positive_amount(&mut errors, "amount", &self.amount);
        check_date(&mut errors, "date", &self.date);
        check_reference(&mut errors, "category", self.category_id, "category");
        check_note(&mut errors, self.note.as_deref());
        errors.into_result()
    }
}

impl Validate for IncomeNew {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_positive_amount(&mut errors, "amount", &self.amount);
        check_date(&mut errors, "date", &self.date);
        check_reference(&mut errors, "category", self.category_id, "category");
        check_note(&mut errors, self.note.as_deref());
        errors.into_result()
    }
}

impl Validate for BudgetNew {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_positive_amount(&mut errors, "amount", &self.amount);
        check_reference(&mut errors, "category", self.category_id, "category");
        check_note(&mut errors, self.note.as_deref());
        let start = check_date(&mut errors, "start_date", &self.start_date);
        let end = check_date(&mut errors, "end_date", &self.end_date);
        if let (Some(start), Some(end)) = (start, end)
            && end <= start
        {
            errors.push("end_date", "End date must be after start date.");
        }
        errors.into_result()
    }
}

impl Validate for GoalNew {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_name(&mut errors, &self.name, GOAL_NAME_MAX_CHARS, "goal");
        match self.target.as_f64() {
            Some(value) if value >= 0.0 => {}
            _ => errors.push("target", "Target must be a number of 0 or more."),
        }
        check_date(&mut errors, "deadline", &self.deadline);
        if !STATUSES.contains(&self.status.as_str()) {
            errors.push(
                "status",
                format!("Status must be one of: {}.", STATUSES.join(", ")),
            );
        }
        check_note(&mut errors, self.note.as_deref());
        errors.into_result()
    }
}

impl Validate for ProjectNew {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_name(&mut errors, &self.name, NAME_MAX_CHARS, "project");
        if parse_date(&self.date_created).is_none() {
            errors.push("date_created", "Please select a creation date.");
        }
        check_reference(&mut errors, "client", self.client_id, "client");
        check_note(&mut errors, self.note.as_deref());
        errors.into_result()
    }
}

impl Validate for ClientNew {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_name(&mut errors, &self.name, NAME_MAX_CHARS, "client");
        if !is_email(self.email.trim()) {
            errors.push("email", "Please enter a valid email address.");
        }
        errors.into_result()
    }
}

impl Validate for CategoryNew {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_name(&mut errors, &self.name, NAME_MAX_CHARS, "category");
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(amount: &str, date: &str) -> ExpenseNew {
        ExpenseNew {
            category_id: 1,
            amount: Amount::from(amount),
            date: date.to_string(),
            note: None,
        }
    }

    #[test]
    fn valid_expense_passes() {
        assert!(expense("12.50", "2024-05-01").validate().is_ok());
    }

    #[test]
    fn expense_rejects_zero_and_garbage_amounts() {
        let err = expense("0", "2024-05-01").validate().unwrap_err();
        assert_eq!(err.field("amount"), Some("Amount must be greater than 0."));
        assert!(expense("ten", "2024-05-01").validate().is_err());
    }

    #[test]
    fn dates_must_be_zero_padded_iso() {
        assert!(expense("1", "2024-5-1").validate().is_err());
        assert!(expense("1", "2024-02-30").validate().is_err());
        assert!(expense("1", "").validate().is_err());
    }

    #[test]
    fn long_note_is_rejected() {
        let mut payload = expense("1", "2024-01-01");
        payload.note = Some("x".repeat(251));
        let err = payload.validate().unwrap_err();
        assert!(err.field("note").is_some());
        assert_eq!(err.fields().count(), 1);
    }

    #[test]
    fn budget_end_must_follow_start() {
        let budget = BudgetNew {
            category_id: 2,
            start_date: "2024-02-01".to_string(),
            end_date: "2024-02-01".to_string(),
            amount: Amount::from("300"),
            note: None,
        };
        let err = budget.validate().unwrap_err();
        assert_eq!(err.field("end_date"), Some("End date must be after start date."));
    }

    #[test]
    fn goal_status_is_restricted() {
        let goal = GoalNew {
            name: "Emergency fund".to_string(),
            target: Amount::from("1000"),
            deadline: "2025-12-31".to_string(),
            note: None,
            status: "Paused".to_string(),
        };
        let err = goal.validate().unwrap_err();
        assert!(err.field("status").is_some());

        let goal = GoalNew {
            status: "In Progress".to_string(),
            ..goal
        };
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn client_requires_name_and_email() {
        let client = ClientNew {
            name: " ".to_string(),
            email: "nobody".to_string(),
            phone_number: None,
        };
        let err = client.validate().unwrap_err();
        assert!(err.field("name").is_some());
        assert!(err.field("email").is_some());
        assert_eq!(
            err.to_string(),
            "email: Please enter a valid email address.; name: Please enter a client name."
        );
    }

    #[test]
    fn email_shape() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a b@c.de"));
        assert!(!is_email("a@@b.co"));
    }

    #[test]
    fn project_requires_client() {
        let project = ProjectNew {
            name: "Website".to_string(),
            date_created: "2024-01-01".to_string(),
            note: None,
            client_id: 0,
        };
        let err = project.validate().unwrap_err();
        assert_eq!(err.field("client"), Some("Please select a client."));
    }
}
