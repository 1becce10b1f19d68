//! Application context wiring identity and tasks together.
//!
//! [`TaskBoard`] owns the shared current-user handle and hands it to the
//! identity session (which writes it) and the task store (which reads it).
//! Its lifecycle is [`TaskBoard::start`] then [`TaskBoard::shutdown`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use thiserror::Error;
use tracing::info;

use crate::backend::{BackendError, HostedBackend};
use crate::config::{BackendConfig, ConfigError};
use crate::identity::{
    adapters::rest::RestIdentityProvider,
    domain::{Session, User},
    ports::IdentityProvider,
    services::{CurrentUser, IdentitySession, IdentitySessionResult},
};
use crate::task::{adapters::rest::RestTaskRowStore, ports::TaskRowStore, services::TaskStore};

/// Errors raised while starting a board against the hosted backend.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The backend client could not be built.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Board wired to the hosted backend adapters.
pub type HostedTaskBoard = TaskBoard<RestIdentityProvider, RestTaskRowStore, DefaultClock>;

/// One running task board: identity session plus task store.
pub struct TaskBoard<P, S, C = DefaultClock>
where
    P: IdentityProvider,
    S: TaskRowStore,
    C: Clock + Send + Sync,
{
    identity: IdentitySession<P>,
    tasks: TaskStore<S, C>,
}

impl<P, S, C> TaskBoard<P, S, C>
where
    P: IdentityProvider,
    S: TaskRowStore,
    C: Clock + Send + Sync,
{
    /// Wires a board over the given ports.
    #[must_use]
    pub fn new(provider: Arc<P>, row_store: Arc<S>, clock: Arc<C>) -> Self {
        let current_user = CurrentUser::new();
        Self {
            identity: IdentitySession::new(provider, current_user.clone()),
            tasks: TaskStore::new(row_store, clock, current_user),
        }
    }

    /// Restores any existing session and loads its tasks.
    pub async fn start(&mut self) {
        self.identity.restore_session().await;
        if self.identity.is_authenticated() {
            self.tasks.fetch_tasks().await;
        }
        info!(
            authenticated = self.identity.is_authenticated(),
            tasks = self.tasks.tasks().len(),
            "task board started"
        );
    }

    /// Signs in and loads the user's tasks.
    ///
    /// # Errors
    ///
    /// Returns the identity session's error when sign-in fails; tasks are
    /// left untouched.
    pub async fn login(&mut self, email: &str, password: &str) -> IdentitySessionResult<User> {
        let user = self.identity.login(email, password).await?;
        self.tasks.fetch_tasks().await;
        Ok(user)
    }

    /// Creates an account and loads its (empty) task list.
    ///
    /// # Errors
    ///
    /// Returns the identity session's error when sign-up fails.
    pub async fn register(&mut self, email: &str, password: &str) -> IdentitySessionResult<User> {
        let user = self.identity.register(email, password).await?;
        self.tasks.fetch_tasks().await;
        Ok(user)
    }

    /// Signs out and drops the task list.
    ///
    /// # Errors
    ///
    /// Returns the provider failure, after local state has been cleared.
    pub async fn logout(&mut self) -> IdentitySessionResult<()> {
        let result = self.identity.logout().await;
        self.tasks.clear();
        result
    }

    /// Stops following provider session changes.
    pub fn shutdown(&mut self) {
        self.identity.shutdown();
        info!("task board shut down");
    }

    /// Returns the identity session.
    #[must_use]
    pub const fn identity(&self) -> &IdentitySession<P> {
        &self.identity
    }

    /// Returns the identity session for direct mutation.
    pub const fn identity_mut(&mut self) -> &mut IdentitySession<P> {
        &mut self.identity
    }

    /// Returns the task store.
    #[must_use]
    pub const fn tasks(&self) -> &TaskStore<S, C> {
        &self.tasks
    }

    /// Returns the task store for direct mutation.
    pub const fn tasks_mut(&mut self) -> &mut TaskStore<S, C> {
        &mut self.tasks
    }
}

impl HostedTaskBoard {
    /// Builds a board against the hosted backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the HTTP client cannot be built.
    pub fn connect(config: &BackendConfig) -> Result<Self, BackendError> {
        HostedBackend::new(config).map(Self::over)
    }

    /// Builds a board that resumes a previously persisted session.
    ///
    /// [`TaskBoard::start`] restores `session`, refreshing it first when its
    /// access token has expired, and loads its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the HTTP client cannot be built.
    pub fn resume(config: &BackendConfig, session: Session) -> Result<Self, BackendError> {
        let backend = HostedBackend::new(config)?;
        backend.set_session(Some(session));
        Ok(Self::over(backend))
    }

    fn over(backend: HostedBackend) -> Self {
        Self::new(
            Arc::new(RestIdentityProvider::new(backend.clone())),
            Arc::new(RestTaskRowStore::new(backend)),
            Arc::new(DefaultClock),
        )
    }

    /// Resolves configuration from the environment and builds a board.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Config`] when the backend URL or key is
    /// missing, which is fatal: no client is built.
    pub fn from_env() -> Result<Self, StartupError> {
        let config = BackendConfig::from_env()?;
        Ok(Self::connect(&config)?)
    }
}
