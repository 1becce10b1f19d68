//! In-memory identity provider for tests and offline demos.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::identity::{
    domain::{AuthChangeEvent, Credentials, Session, User, UserId},
    ports::{
        AuthStateListener, IdentityProvider, IdentityProviderError, IdentityProviderResult,
        ListenerRegistry, Subscription,
    },
};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const ALREADY_REGISTERED: &str = "User already registered";

/// Thread-safe in-memory identity provider.
///
/// Accounts live in a map keyed by email. Sign-in and sign-up establish a
/// session and notify listeners the way a hosted provider would. The
/// provider can be switched offline to exercise failure paths.
#[derive(Clone, Default)]
pub struct InMemoryIdentityProvider {
    state: Arc<RwLock<InMemoryIdentityState>>,
    listeners: ListenerRegistry,
}

#[derive(Default)]
struct InMemoryIdentityState {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    offline: bool,
    issued_tokens: u64,
}

struct Account {
    user: User,
    password: Zeroizing<String>,
}

impl InMemoryIdentityProvider {
    /// Creates a provider with no accounts and no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account and returns its user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Rejected`] when the email is already
    /// registered.
    pub fn add_account(&self, credentials: &Credentials) -> IdentityProviderResult<User> {
        let mut state = self.write_state()?;
        insert_account(&mut state, credentials)
    }

    /// Establishes a session for an existing account without notifying
    /// listeners, as if it had been persisted by an earlier run.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Rejected`] when no account matches
    /// the credentials.
    pub fn persist_session(&self, credentials: &Credentials) -> IdentityProviderResult<Session> {
        let mut state = self.write_state()?;
        open_session(&mut state, credentials)
    }

    /// Switches the provider offline (every call fails) or back online.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.write_state() {
            state.offline = offline;
        }
    }

    /// Pushes a session-change notification, replacing the held session.
    pub fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        if let Ok(mut state) = self.write_state() {
            state.session.clone_from(&session);
        }
        self.listeners.notify(event, session.as_ref());
    }

    /// Returns the number of registered session listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn read_state(&self) -> IdentityProviderResult<RwLockReadGuard<'_, InMemoryIdentityState>> {
        self.state.read().map_err(|err| poisoned(&err))
    }

    fn write_state(&self) -> IdentityProviderResult<RwLockWriteGuard<'_, InMemoryIdentityState>> {
        self.state.write().map_err(|err| poisoned(&err))
    }
}

fn poisoned(err: &impl ToString) -> IdentityProviderError {
    IdentityProviderError::transport(std::io::Error::other(err.to_string()))
}

fn offline_error() -> IdentityProviderError {
    IdentityProviderError::transport(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "identity provider is offline",
    ))
}

fn ensure_online(state: &InMemoryIdentityState) -> IdentityProviderResult<()> {
    if state.offline {
        return Err(offline_error());
    }
    Ok(())
}

fn insert_account(
    state: &mut InMemoryIdentityState,
    credentials: &Credentials,
) -> IdentityProviderResult<User> {
    if state.accounts.contains_key(credentials.email()) {
        return Err(IdentityProviderError::rejected(ALREADY_REGISTERED));
    }
    let user = User::new(UserId::new(Uuid::new_v4().to_string()), credentials.email());
    state.accounts.insert(
        credentials.email().to_owned(),
        Account {
            user: user.clone(),
            password: Zeroizing::new(credentials.password().to_owned()),
        },
    );
    Ok(user)
}

fn open_session(
    state: &mut InMemoryIdentityState,
    credentials: &Credentials,
) -> IdentityProviderResult<Session> {
    let user = state
        .accounts
        .get(credentials.email())
        .filter(|account| account.password.as_str() == credentials.password())
        .map(|account| account.user.clone())
        .ok_or_else(|| IdentityProviderError::rejected(INVALID_CREDENTIALS))?;
    state.issued_tokens = state.issued_tokens.wrapping_add(1);
    let session = Session::new(format!("memory-token-{}", state.issued_tokens), user);
    state.session = Some(session.clone());
    Ok(session)
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> IdentityProviderResult<User> {
        let session = {
            let mut state = self.write_state()?;
            ensure_online(&state)?;
            open_session(&mut state, credentials)?
        };
        self.listeners.notify(AuthChangeEvent::SignedIn, Some(&session));
        Ok(session.into_user())
    }

    async fn sign_up(&self, credentials: &Credentials) -> IdentityProviderResult<User> {
        let session = {
            let mut state = self.write_state()?;
            ensure_online(&state)?;
            insert_account(&mut state, credentials)?;
            open_session(&mut state, credentials)?
        };
        self.listeners.notify(AuthChangeEvent::SignedIn, Some(&session));
        Ok(session.into_user())
    }

    async fn sign_out(&self) -> IdentityProviderResult<()> {
        let outcome = {
            let mut state = self.write_state()?;
            state.session = None;
            ensure_online(&state)
        };
        self.listeners.notify(AuthChangeEvent::SignedOut, None);
        outcome
    }

    async fn get_session(&self) -> IdentityProviderResult<Option<Session>> {
        let state = self.read_state()?;
        ensure_online(&state)?;
        Ok(state.session.clone())
    }

    fn on_auth_state_change(&self, listener: AuthStateListener) -> Subscription {
        let session = self
            .read_state()
            .ok()
            .and_then(|state| state.session.clone());
        listener(AuthChangeEvent::InitialSession, session);
        self.listeners.subscribe(listener)
    }
}
