//! Project Euler problem of the day.
//!
//! The current problem number lives in a single database row. Reading the
//! current problem scrapes its page from projecteuler.net on every call;
//! moving to the next or previous problem only touches the stored number.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::info;

use crate::error::StorageError;

pub mod fetcher;
pub mod store;

pub use fetcher::{
    FetchError, HttpProblemFetcher, HttpProblemFetcherBuilder, ParseError, ProblemContent,
    ProblemFetchError, ProblemFetcher,
};
pub use store::{MemoryProblemStore, ProblemStore};

/// Id of the seeded `project_euler` row.
pub const DEFAULT_PROBLEM_ID: &str = "b11f93b9-1e7c-4bfa-909b-ce29234d8c05";

#[derive(Debug, Error)]
pub enum EulerError {
    #[error("could not read current project euler problem: {0}")]
    Storage(#[source] StorageError),
    #[error("could not update project euler problem ({direction}): {source}")]
    Update {
        direction: Direction,
        #[source]
        source: StorageError,
    },
    #[error("could not get project euler problem {number}: {source}")]
    Fetch {
        number: i64,
        #[source]
        source: ProblemFetchError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    pub fn delta(self) -> i64 {
        match self {
            Direction::Next => 1,
            Direction::Prev => -1,
        }
    }
}

/// Response body of `GET /project-euler/get-problem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EulerProblem {
    pub id: String,
    pub number: i64,
    pub name: String,
    pub html: String,
}

/// Body accepted by the next/prev endpoints. The number is informational;
/// the stored value is always the one that gets moved.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProblemChange {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub number: Option<i64>,
}

#[derive(Clone)]
pub struct ProblemService {
    store: Arc<dyn ProblemStore>,
    fetcher: Arc<dyn ProblemFetcher>,
}

impl ProblemService {
    pub fn new(store: Arc<dyn ProblemStore>, fetcher: Arc<dyn ProblemFetcher>) -> Self {
        Self { store, fetcher }
    }

    pub async fn get_current(&self) -> Result<EulerProblem, EulerError> {
        let number = self
            .store
            .current_number()
            .await
            .map_err(EulerError::Storage)?;

        let content = self
            .fetcher
            .fetch_problem(number)
            .await
            .map_err(|source| EulerError::Fetch { number, source })?;

        Ok(EulerProblem {
            id: self.store.problem_id().to_string(),
            number,
            name: content.title,
            html: content.body_html,
        })
    }

    /// Move the stored number one step and return the new value.
    ///
    /// The step is a single atomic update in the store, so concurrent
    /// callers never lose each other's changes. No bounds are enforced.
    pub async fn change(&self, direction: Direction) -> Result<i64, EulerError> {
        let number = self
            .store
            .shift_current_number(direction.delta())
            .await
            .map_err(|source| EulerError::Update { direction, source })?;

        info!(%direction, number, "project euler problem changed");
        Ok(number)
    }

    pub async fn advance(&self) -> Result<i64, EulerError> {
        self.change(Direction::Next).await
    }

    pub async fn retreat(&self) -> Result<i64, EulerError> {
        self.change(Direction::Prev).await
    }
}
