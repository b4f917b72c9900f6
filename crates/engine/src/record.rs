//! Field accessors the filter engine reads from each record type.

use api_types::{
    Amount, budget::Budget, category::Category, client::Client, expense::Expense, goal::Goal,
    income::Income, project::Project,
};

/// Read-only view of a record for filtering and sorting.
///
/// Every accessor defaults to `None`: a record that lacks a field never
/// satisfies a bound on that field.
pub trait Filterable {
    fn category_id(&self) -> Option<i64> {
        None
    }

    fn client_id(&self) -> Option<i64> {
        None
    }

    /// ISO-8601 `YYYY-MM-DD` date the record is filtered and sorted by.
    fn date(&self) -> Option<&str> {
        None
    }

    fn amount(&self) -> Option<&Amount> {
        None
    }

    fn note(&self) -> Option<&str> {
        None
    }

    fn name(&self) -> Option<&str> {
        None
    }

    fn client_name(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    /// Fields matched by the free-text search. Defaults to the note.
    fn search_fields(&self) -> Vec<&str> {
        self.note().into_iter().collect()
    }
}

impl Filterable for Expense {
    fn category_id(&self) -> Option<i64> {
        Some(self.category.id)
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }

    fn amount(&self) -> Option<&Amount> {
        Some(&self.amount)
    }

    fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.category.name)
    }
}

impl Filterable for Income {
    fn category_id(&self) -> Option<i64> {
        Some(self.category.id)
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }

    fn amount(&self) -> Option<&Amount> {
        Some(&self.amount)
    }

    fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.category.name)
    }
}

impl Filterable for Budget {
    fn category_id(&self) -> Option<i64> {
        Some(self.category.id)
    }

    fn date(&self) -> Option<&str> {
        Some(&self.start_date)
    }

    fn amount(&self) -> Option<&Amount> {
        Some(&self.amount)
    }

    fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.category.name)
    }
}

impl Filterable for Goal {
    fn date(&self) -> Option<&str> {
        Some(&self.deadline)
    }

    fn amount(&self) -> Option<&Amount> {
        Some(&self.target)
    }

    fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
}

impl Filterable for Project {
    fn client_id(&self) -> Option<i64> {
        self.client.as_ref().map(|client| client.id)
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date_created)
    }

    fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn client_name(&self) -> Option<&str> {
        self.client.as_ref().map(|client| client.name.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.note.as_deref());
        fields
    }
}

impl Filterable for Client {
    fn client_id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn client_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.phone_number.as_deref());
        fields
    }
}

impl Filterable for Category {
    fn category_id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}
