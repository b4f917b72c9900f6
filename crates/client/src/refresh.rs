//! Single-flight coordination of access token refreshes.
//!
//! When several requests are rejected with 401 at the same time, exactly one
//! of them (the leader) starts a refresh episode; every other caller attaches
//! to the same shared outcome. The check-and-set of the episode happens under
//! a synchronous lock that is never held across an `.await`, so two callers
//! can never both observe `Idle` and start competing episodes.
//!
//! ```text
//! Idle --(401, no episode)--> Refreshing(shared outcome) --(resolved)--> Idle
//! ```
//!
//! The outcome is cached only inside the shared future: once the episode is
//! torn down, a later 401 starts a new one.

use std::{
    future::Future,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use api_types::auth::AccessToken;
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};

use crate::{error::RefreshError, session::Session};

type SharedOutcome = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

#[derive(Default)]
enum RefreshState {
    #[default]
    Idle,
    Refreshing {
        episode: u64,
        outcome: SharedOutcome,
    },
}

#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    episodes: AtomicU64,
}

impl RefreshCoordinator {
    fn state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a usable access token, refreshing it at most once per episode.
    ///
    /// `rejected` is the access token the failed request carried. If the
    /// session already holds a different one, another caller refreshed in the
    /// meantime and that token is returned without a network call.
    ///
    /// `call` performs the refresh request; it is invoked only by the leader.
    pub(crate) async fn refresh_if_needed<F, Fut>(
        &self,
        session: &Session,
        rejected: Option<&str>,
        call: F,
    ) -> Result<String, RefreshError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<AccessToken, RefreshError>> + Send + 'static,
    {
        let (episode, outcome) = {
            let mut state = self.state();
            match &*state {
                RefreshState::Refreshing { episode, outcome } => {
                    tracing::debug!(episode, "joining token refresh in flight");
                    (*episode, outcome.clone())
                }
                RefreshState::Idle => {
                    let snapshot = session.snapshot();
                    if let Some(current) = snapshot.access.as_deref()
                        && rejected != Some(current)
                    {
                        return Ok(current.to_string());
                    }
                    let Some(refresh) = snapshot.refresh else {
                        session.expire(snapshot.generation);
                        return Err(RefreshError::MissingRefreshToken);
                    };

                    let episode = self.episodes.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::info!(episode, "refreshing access token");
                    let outcome = run_episode(session.clone(), snapshot.generation, call(refresh))
                        .boxed()
                        .shared();
                    *state = RefreshState::Refreshing {
                        episode,
                        outcome: outcome.clone(),
                    };
                    (episode, outcome)
                }
            }
        };

        let result = outcome.await;

        let mut state = self.state();
        if matches!(&*state, RefreshState::Refreshing { episode: current, .. } if *current == episode)
        {
            *state = RefreshState::Idle;
            match &result {
                Ok(_) => tracing::info!(episode, "access token refreshed"),
                Err(err) => tracing::warn!(episode, "token refresh failed: {err}"),
            }
        }
        result
    }
}

/// Applies the refresh outcome to the session, unless a login or logout
/// happened after `generation`.
async fn run_episode<Fut>(
    session: Session,
    generation: u64,
    call: Fut,
) -> Result<String, RefreshError>
where
    Fut: Future<Output = Result<AccessToken, RefreshError>>,
{
    match call.await {
        Ok(AccessToken { access, refresh }) => {
            if session.apply_refresh(generation, access.clone(), refresh) {
                Ok(access)
            } else {
                tracing::info!("session changed during refresh, dropping new token");
                Err(RefreshError::Superseded)
            }
        }
        Err(err) => {
            session.expire(generation);
            Err(err)
        }
    }
}
