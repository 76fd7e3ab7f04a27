//! Intake runtime configuration.
//!
//! Resolved once at startup and passed into the session and store factories,
//! so nothing reads process environment while a form is being handled.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_ROUTE_BASE: &str = "/labs";
pub const DEFAULT_PATIENT_SEARCH_LIMIT: usize = 10;

pub const ENV_DATABASE: &str = "LAB_INTAKE_DATABASE";
pub const ENV_ROUTE_BASE: &str = "LAB_INTAKE_ROUTE_BASE";
pub const ENV_PATIENT_SEARCH_LIMIT: &str = "LAB_INTAKE_PATIENT_SEARCH_LIMIT";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid route base {0:?}: must start with '/' and not end with '/'")]
    InvalidRouteBase(String),

    #[error("invalid patient search limit {0:?}: must be a positive integer")]
    InvalidSearchLimit(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where the store lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseLocation {
    InMemory,
    File(PathBuf),
}

#[derive(Clone, Debug)]
pub struct IntakeConfig {
    database: DatabaseLocation,
    route_base: String,
    patient_search_limit: usize,
}

impl IntakeConfig {
    pub fn new(
        database: DatabaseLocation,
        route_base: impl Into<String>,
        patient_search_limit: usize,
    ) -> ConfigResult<Self> {
        let route_base = route_base.into();
        if !route_base.starts_with('/') || (route_base.len() > 1 && route_base.ends_with('/')) {
            return Err(ConfigError::InvalidRouteBase(route_base));
        }
        if patient_search_limit == 0 {
            return Err(ConfigError::InvalidSearchLimit(
                patient_search_limit.to_string(),
            ));
        }

        Ok(Self {
            database,
            route_base,
            patient_search_limit,
        })
    }

    /// Build from `LAB_INTAKE_*` environment variables, falling back to defaults.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let database = match lookup(ENV_DATABASE) {
            Some(path) if !path.trim().is_empty() && path != ":memory:" => {
                DatabaseLocation::File(PathBuf::from(path))
            }
            _ => DatabaseLocation::InMemory,
        };

        let route_base = lookup(ENV_ROUTE_BASE).unwrap_or_else(|| DEFAULT_ROUTE_BASE.into());

        let patient_search_limit = match lookup(ENV_PATIENT_SEARCH_LIMIT) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidSearchLimit(raw.clone()))?,
            None => DEFAULT_PATIENT_SEARCH_LIMIT,
        };

        Self::new(database, route_base, patient_search_limit)
    }

    pub fn database(&self) -> &DatabaseLocation {
        &self.database
    }

    pub fn database_path(&self) -> Option<&Path> {
        match &self.database {
            DatabaseLocation::File(path) => Some(path),
            DatabaseLocation::InMemory => None,
        }
    }

    /// Route of the list view, e.g. `/labs`.
    pub fn list_route(&self) -> &str {
        &self.route_base
    }

    /// Route of the detail view for a saved record, e.g. `/labs/1234`.
    pub fn detail_route(&self, id: &str) -> String {
        format!("{}/{}", self.route_base.trim_end_matches('/'), id)
    }

    pub fn patient_search_limit(&self) -> usize {
        self.patient_search_limit
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            database: DatabaseLocation::InMemory,
            route_base: DEFAULT_ROUTE_BASE.into(),
            patient_search_limit: DEFAULT_PATIENT_SEARCH_LIMIT,
        }
    }
}
