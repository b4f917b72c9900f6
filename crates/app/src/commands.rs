use std::io::{self, BufRead, Write};

use api_types::{
    budget::Budget, category::Category, client::Client, expense::Expense, goal::Goal,
    income::Income, project::Project,
};
use client::{ApiClient, AuthState, Resource};
use engine::{FilterSpec, Filterable, Validate, apply_filters};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    cli::{Command, ResourceKind},
    error::{AppError, Result},
};

/// Runs `$func::<Record>(args..)` for the record type behind a [`ResourceKind`].
macro_rules! for_resource {
    ($kind:expr, $func:ident($($arg:expr),*)) => {
        match $kind {
            ResourceKind::Expenses => $func::<Expense>($($arg),*).await,
            ResourceKind::Income => $func::<Income>($($arg),*).await,
            ResourceKind::Budgets => $func::<Budget>($($arg),*).await,
            ResourceKind::Goals => $func::<Goal>($($arg),*).await,
            ResourceKind::Projects => $func::<Project>($($arg),*).await,
            ResourceKind::Clients => $func::<Client>($($arg),*).await,
            ResourceKind::Categories => $func::<Category>($($arg),*).await,
        }
    };
}

pub async fn run(api: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => {
            let password = read_password()?;
            api.login(&username, &password).await?;
            println!("logged in as {username}");
            Ok(())
        }
        Command::Logout => {
            api.logout()?;
            println!("logged out");
            Ok(())
        }
        Command::Status => {
            let state = match api.session().state() {
                AuthState::Authenticated => "logged in",
                AuthState::Unauthenticated => "logged out",
                AuthState::Expired => "session expired",
            };
            println!("{state} ({})", api.base_url());
            Ok(())
        }
        Command::Dashboard => print_json(&api.dashboard().await?),
        Command::List { resource, filters } => {
            let spec = filters.into_spec(resource.preset())?;
            for_resource!(resource, list(api, &spec))
        }
        Command::Show { resource, id } => for_resource!(resource, show(api, id)),
        Command::Delete { resource, id } => for_resource!(resource, delete(api, id)),
        Command::Create { resource, json } => for_resource!(resource, create(api, &json)),
        Command::Update { resource, id, json } => {
            for_resource!(resource, update(api, id, &json))
        }
    }
}

async fn list<R>(api: &ApiClient, spec: &FilterSpec) -> Result<()>
where
    R: Resource + Filterable + Clone + Serialize,
{
    let records: Vec<R> = api.list().await?;
    let filtered = apply_filters(&records, spec);
    tracing::debug!(
        total = records.len(),
        shown = filtered.len(),
        "filtered {}",
        R::PATH
    );
    print_json(&filtered)
}

async fn show<R>(api: &ApiClient, id: i64) -> Result<()>
where
    R: Resource + Serialize,
{
    let record: R = api.get(id).await?;
    print_json(&record)
}

async fn delete<R: Resource>(api: &ApiClient, id: i64) -> Result<()> {
    api.delete::<R>(id).await?;
    println!("deleted {id}");
    Ok(())
}

async fn create<R>(api: &ApiClient, json: &str) -> Result<()>
where
    R: Resource + Serialize,
    R::Payload: DeserializeOwned + Validate,
{
    let payload: R::Payload = serde_json::from_str(json)?;
    payload.validate()?;
    let created: R = api.create(&payload).await?;
    print_json(&created)
}

async fn update<R>(api: &ApiClient, id: i64, json: &str) -> Result<()>
where
    R: Resource + Serialize,
    R::Payload: DeserializeOwned + Validate,
{
    let payload: R::Payload = serde_json::from_str(json)?;
    payload.validate()?;
    let updated: R = api.update(id, &payload).await?;
    print_json(&updated)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var("TALLY_PASSWORD")
        && !password.is_empty()
    {
        return Ok(password);
    }

    eprint!("password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(AppError::Input("password must not be empty".to_string()));
    }
    Ok(password)
}
