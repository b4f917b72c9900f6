//! Typed CRUD operations over the backend collections.

use api_types::{
    budget::{Budget, BudgetNew},
    category::{Category, CategoryNew, CategoryType},
    client::{Client, ClientNew},
    dashboard::Dashboard,
    expense::{Expense, ExpenseNew},
    goal::{Goal, GoalNew},
    income::{Income, IncomeNew},
    project::{Project, ProjectNew},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{ClientError, Result},
    http::{ApiClient, RequestOptions},
};

pub const DASHBOARD_ENDPOINT: &str = "/api/dashboard/";

/// A record type served as a REST collection.
///
/// `PATH` is the collection endpoint (`GET` list, `POST` create); items live
/// at `PATH{id}/` (`GET`, `PUT`, `DELETE`).
pub trait Resource: DeserializeOwned + Send {
    const PATH: &'static str;
    /// Body accepted by create and update.
    type Payload: Serialize + Sync;
}

impl Resource for Expense {
    const PATH: &'static str = "/expenses/";
    type Payload = ExpenseNew;
}

impl Resource for Income {
    const PATH: &'static str = "/income/";
    type Payload = IncomeNew;
}

impl Resource for Budget {
    const PATH: &'static str = "/budgets/";
    type Payload = BudgetNew;
}

impl Resource for Goal {
    const PATH: &'static str = "/goals/";
    type Payload = GoalNew;
}

impl Resource for Project {
    const PATH: &'static str = "/projects/";
    type Payload = ProjectNew;
}

impl Resource for Client {
    const PATH: &'static str = "/clients/";
    type Payload = ClientNew;
}

impl Resource for Category {
    const PATH: &'static str = "/categories/";
    type Payload = CategoryNew;
}

fn item_path<R: Resource>(id: i64) -> String {
    format!("{}{id}/", R::PATH)
}

impl ApiClient {
    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T> {
        match self.request(endpoint, options).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(ClientError::EmptyBody {
                endpoint: endpoint.to_string(),
            }),
        }
    }

    pub async fn list<R: Resource>(&self) -> Result<Vec<R>> {
        self.fetch(R::PATH, RequestOptions::get()).await
    }

    pub async fn get<R: Resource>(&self, id: i64) -> Result<R> {
        self.fetch(&item_path::<R>(id), RequestOptions::get()).await
    }

    pub async fn create<R: Resource>(&self, payload: &R::Payload) -> Result<R> {
        let body = serde_json::to_value(payload)?;
        self.fetch(R::PATH, RequestOptions::post(body)).await
    }

    pub async fn update<R: Resource>(&self, id: i64, payload: &R::Payload) -> Result<R> {
        let body = serde_json::to_value(payload)?;
        self.fetch(&item_path::<R>(id), RequestOptions::put(body))
            .await
    }

    /// Deletes an item. The backend answers 204; any body is ignored.
    pub async fn delete<R: Resource>(&self, id: i64) -> Result<()> {
        self.request(&item_path::<R>(id), RequestOptions::delete())
            .await
            .map(|_| ())
    }

    /// Categories, optionally restricted to one type.
    pub async fn categories(&self, kind: Option<CategoryType>) -> Result<Vec<Category>> {
        let endpoint = match kind {
            Some(CategoryType::Expense) => format!("{}?type=EXPENSE", Category::PATH),
            Some(CategoryType::Income) => format!("{}?type=INCOME", Category::PATH),
            None => Category::PATH.to_string(),
        };
        self.fetch(&endpoint, RequestOptions::get()).await
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.fetch(DASHBOARD_ENDPOINT, RequestOptions::get()).await
    }
}
