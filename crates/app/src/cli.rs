use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{FilterError, FilterSpec, Selection, SortKey, SortOrder};

#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(about = "Track expenses, income, budgets, goals, projects and clients")]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags layered on top of the config file and environment.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://localhost:8000).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override where the token pair is persisted.
    #[arg(long, global = true)]
    pub session_file: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in. The password is read from `TALLY_PASSWORD` or stdin, never from flags.
    Login { username: String },
    Logout,
    /// Show whether a session is stored.
    Status,
    Dashboard,
    List {
        resource: ResourceKind,
        #[command(flatten)]
        filters: FilterArgs,
    },
    Show {
        resource: ResourceKind,
        id: i64,
    },
    Delete {
        resource: ResourceKind,
        id: i64,
    },
    Create {
        resource: ResourceKind,
        /// JSON body, e.g. '{"category_id":1,"amount":"9.50","date":"2024-03-01","note":null}'.
        #[arg(long)]
        json: String,
    },
    Update {
        resource: ResourceKind,
        id: i64,
        #[arg(long)]
        json: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Expenses,
    Income,
    Budgets,
    Goals,
    Projects,
    Clients,
    Categories,
}

impl ResourceKind {
    /// The default sort each list page starts with.
    pub fn preset(self) -> FilterSpec {
        match self {
            Self::Expenses => FilterSpec::expenses(),
            Self::Income => FilterSpec::income(),
            Self::Budgets => FilterSpec::budgets(),
            Self::Goals => FilterSpec::goals(),
            Self::Projects => FilterSpec::projects(),
            Self::Clients => FilterSpec::clients(),
            Self::Categories => FilterSpec::default(),
        }
    }
}

/// List filters. Raw strings are kept so an empty value can clear a preset.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Category id, or "all".
    #[arg(long)]
    pub category: Option<String>,
    /// Client id, or "all".
    #[arg(long)]
    pub client: Option<String>,
    /// Inclusive lower date bound, YYYY-MM-DD.
    #[arg(long)]
    pub date_from: Option<String>,
    /// Inclusive upper date bound, YYYY-MM-DD.
    #[arg(long)]
    pub date_to: Option<String>,
    #[arg(long)]
    pub amount_min: Option<f64>,
    #[arg(long)]
    pub amount_max: Option<f64>,
    /// Case-insensitive substring of the note (or name for projects and clients).
    #[arg(long)]
    pub search: Option<String>,
    /// Exact goal status, e.g. "In Progress".
    #[arg(long)]
    pub status: Option<String>,
    /// date, amount, name or client.
    #[arg(long)]
    pub sort_by: Option<String>,
    /// asc or desc.
    #[arg(long)]
    pub sort_order: Option<String>,
}

impl FilterArgs {
    /// Overlays the given flags on `preset`.
    pub fn into_spec(self, preset: FilterSpec) -> Result<FilterSpec, FilterError> {
        let mut spec = preset;

        if let Some(category) = self.category {
            spec.category = category.parse::<Selection>()?;
        }
        if let Some(client) = self.client {
            spec.client = client.parse::<Selection>()?;
        }
        if self.date_from.is_some() {
            spec.date_from = self.date_from;
        }
        if self.date_to.is_some() {
            spec.date_to = self.date_to;
        }
        if self.amount_min.is_some() {
            spec.amount_min = self.amount_min;
        }
        if self.amount_max.is_some() {
            spec.amount_max = self.amount_max;
        }
        if self.search.is_some() {
            spec.search_text = self.search;
        }
        if self.status.is_some() {
            spec.status = self.status;
        }
        if let Some(sort_by) = self.sort_by {
            spec.sort_by = match sort_by.trim() {
                "" => None,
                key => Some(key.parse::<SortKey>()?),
            };
        }
        if let Some(sort_order) = self.sort_order {
            spec.sort_order = sort_order.parse::<SortOrder>()?;
        }

        Ok(spec)
    }
}
