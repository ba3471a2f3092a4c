use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, info, warn};

use super::claims::{self, IdentityClaims};
use crate::client::{Dispatcher, HttpMethod};
use crate::error::ClientResult;
use crate::models::TokenPair;
use crate::store::{self, PreferenceStore, SecretStore, GROUP_ID_KEY};

pub const REFRESH_PATH: &str = "/tokens/refresh";

/// Lifecycle of the stored access token as last observed by `ensure_valid_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No token pair in the secret store.
    Unknown,
    Valid,
    Expired,
    Refreshing,
    /// Refresh failed or the stored pair is unusable; requests go out unsigned.
    Unauthenticated,
}

type SharedRefresh = Shared<BoxFuture<'static, Option<TokenPair>>>;

/// Owns the token pair lifecycle for one signed-in household member.
///
/// All locks are released before any `.await`. Refresh is single-flight: callers that
/// find the token expired while a refresh is running await that same refresh.
pub struct SessionManager {
    dispatcher: Dispatcher,
    secrets: Arc<dyn SecretStore>,
    preferences: Arc<dyn PreferenceStore>,
    leeway: Duration,
    state: RwLock<SessionState>,
    access_token: RwLock<Option<String>>,
    claims: RwLock<IdentityClaims>,
    group_id: RwLock<Option<String>>,
    in_flight: Mutex<Option<SharedRefresh>>,
    // bumped on logout so a refresh finishing afterwards does not resurrect the pair
    epoch: Arc<AtomicU64>,
    // held while checking `epoch` and writing session state; reentrant so a store
    // callback may log out from inside a save
    commit: Arc<ReentrantMutex<()>>,
}

impl SessionManager {
    pub fn new(
        dispatcher: Dispatcher,
        secrets: Arc<dyn SecretStore>,
        preferences: Arc<dyn PreferenceStore>,
        leeway_secs: i64,
    ) -> Self {
        let leeway = Duration::try_seconds(leeway_secs).unwrap_or_else(|| {
            warn!(target: "pantry::session", "expiry leeway {}s out of range; using none", leeway_secs);
            Duration::zero()
        });
        Self {
            dispatcher,
            secrets,
            preferences,
            leeway,
            state: RwLock::new(SessionState::Unknown),
            access_token: RwLock::new(None),
            claims: RwLock::new(IdentityClaims::default()),
            group_id: RwLock::new(None),
            in_flight: Mutex::new(None),
            epoch: Arc::new(AtomicU64::new(0)),
            commit: Arc::new(ReentrantMutex::new(())),
        }
    }

    pub fn state(&self) -> SessionState { *self.state.read() }

    pub fn is_authenticated(&self) -> bool { self.state() == SessionState::Valid }

    /// Token used to sign the next request, if any.
    pub fn access_token(&self) -> Option<String> { self.access_token.read().clone() }

    pub fn claims(&self) -> IdentityClaims { self.claims.read().clone() }

    pub fn group_id(&self) -> Option<String> { self.group_id.read().clone() }

    /// Make sure the next request is signed with a live token, refreshing if needed.
    ///
    /// A valid token costs no network traffic. An expired or undecodable one triggers
    /// exactly one `/tokens/refresh` call (shared with concurrent callers). When the
    /// refresh fails the in-memory token is dropped but the stored pair stays as is.
    pub async fn ensure_valid_token(&self) -> SessionState {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let stored = match store::load_token_pair(self.secrets.as_ref()) {
            Ok(p) => p,
            Err(e) => {
                warn!(target: "pantry::session", "cannot read token pair: {}", e);
                None
            }
        };
        let Some(pair) = stored else {
            return self.commit_state(epoch, SessionState::Unknown, || self.forget_identity());
        };
        if !pair.is_usable() {
            return self.commit_state(epoch, SessionState::Unauthenticated, || {
                self.access_token.write().take();
            });
        }
        if !claims::is_expired(&pair.access_token, Utc::now(), self.leeway) {
            return self.commit_state(epoch, SessionState::Valid, || self.adopt(&pair.access_token));
        }

        self.commit_state(epoch, SessionState::Expired, || {});
        debug!(target: "pantry::session", "access token expired; refreshing");
        let handle = self.refresh_handle(pair);
        self.commit_state(epoch, SessionState::Refreshing, || {});
        let outcome = handle.clone().await;
        {
            let mut slot = self.in_flight.lock();
            if slot.as_ref().map(|f| f.ptr_eq(&handle)).unwrap_or(false) {
                *slot = None;
            }
        }
        match outcome {
            Some(fresh) => self.commit_state(epoch, SessionState::Valid, || self.adopt(&fresh.access_token)),
            None => self.commit_state(epoch, SessionState::Unauthenticated, || {
                self.access_token.write().take();
            }),
        }
    }

    /// Install a pair obtained from login or registration.
    pub fn establish(&self, pair: &TokenPair) -> ClientResult<()> {
        let _commit = self.commit.lock();
        store::save_token_pair(self.secrets.as_ref(), pair)?;
        self.adopt(&pair.access_token);
        self.set_state(SessionState::Valid);
        info!(target: "pantry::session", "session established for {:?}", self.claims.read().id);
        Ok(())
    }

    /// Refresh identity claims from `token`. Decode failures are logged and leave the
    /// current claims untouched.
    pub fn set_from_token(&self, token: &str) {
        let decoded = match claims::decode(token) {
            Ok(d) => d,
            Err(e) => {
                warn!(target: "pantry::session", "ignoring undecodable access token: {}", e);
                return;
            }
        };
        self.claims.write().apply(&decoded);

        match self.preferences.get_preference(GROUP_ID_KEY) {
            Ok(Some(stored)) => {
                let mut current = self.group_id.write();
                if current.as_deref() != Some(stored.as_str()) {
                    debug!(target: "pantry::session", "adopting stored group {}", stored);
                    *current = Some(stored);
                }
            }
            Ok(None) => {}
            Err(e) => warn!(target: "pantry::session", "cannot read group preference: {}", e),
        }
    }

    /// Switch the active household group, persisting the choice.
    pub fn set_group_id(&self, group_id: Option<&str>) -> ClientResult<()> {
        match group_id {
            Some(g) => self.preferences.set_preference(GROUP_ID_KEY, g)?,
            None => self.preferences.remove_preference(GROUP_ID_KEY)?,
        }
        *self.group_id.write() = group_id.map(|g| g.to_string());
        Ok(())
    }

    /// Forget everything about the current user. Safe to call repeatedly.
    ///
    /// Every step runs even if an earlier one fails; the first store error is returned.
    pub fn logout(&self) -> ClientResult<()> {
        let _commit = self.commit.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.in_flight.lock().take();
        let secrets = store::clear_token_pair(self.secrets.as_ref());
        let prefs = self.preferences.remove_preference(GROUP_ID_KEY);
        self.group_id.write().take();
        self.forget_identity();
        self.set_state(SessionState::Unknown);
        info!(target: "pantry::session", "logged out");
        secrets.and(prefs)
    }

    // Apply `next` unless a logout happened after `epoch` was observed; in that case
    // the state logout left behind is reported unchanged.
    fn commit_state<F: FnOnce()>(&self, epoch: u64, next: SessionState, apply: F) -> SessionState {
        let _commit = self.commit.lock();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(target: "pantry::session", "logged out meanwhile; not entering {:?}", next);
            return self.state();
        }
        apply();
        self.set_state(next)
    }

    fn forget_identity(&self) {
        self.access_token.write().take();
        *self.claims.write() = IdentityClaims::default();
    }

    fn adopt(&self, access_token: &str) {
        self.set_from_token(access_token);
        *self.access_token.write() = Some(access_token.to_string());
    }

    fn set_state(&self, next: SessionState) -> SessionState {
        let mut state = self.state.write();
        if *state != next {
            debug!(target: "pantry::session", "session {:?} -> {:?}", *state, next);
        }
        *state = next;
        next
    }

    // Join the running refresh or start one. A refresh that already completed for
    // another caller shows up as a newer, live pair in the store and is reused.
    fn refresh_handle(&self, stale: TokenPair) -> SharedRefresh {
        let mut slot = self.in_flight.lock();
        if let Some(running) = slot.as_ref() {
            return running.clone();
        }
        if let Ok(Some(current)) = store::load_token_pair(self.secrets.as_ref()) {
            if current.access_token != stale.access_token
                && current.is_usable()
                && !claims::is_expired(&current.access_token, Utc::now(), self.leeway)
            {
                return future::ready(Some(current)).boxed().shared();
            }
        }

        let dispatcher = self.dispatcher.clone();
        let secrets = Arc::clone(&self.secrets);
        let epoch = Arc::clone(&self.epoch);
        let commit = Arc::clone(&self.commit);
        let started = epoch.load(Ordering::SeqCst);
        let fut = async move {
            let fresh = match dispatcher
                .send::<TokenPair, TokenPair>(HttpMethod::Post, REFRESH_PATH, Some(&stale), None)
                .await
            {
                Ok(p) => p,
                Err(e) => {
                    warn!(target: "pantry::session", "token refresh failed: {}", e);
                    return None;
                }
            };
            store_refreshed(secrets.as_ref(), &epoch, &commit, started, fresh)
        }
        .boxed()
        .shared();
        *slot = Some(fut.clone());
        fut
    }
}

// Persist a refreshed pair unless a logout happened since the refresh started.
// The check and the write happen under `commit`, so logout sees either no write
// or a finished one it then clears.
fn store_refreshed(
    secrets: &dyn SecretStore,
    epoch: &AtomicU64,
    commit: &ReentrantMutex<()>,
    started: u64,
    fresh: TokenPair,
) -> Option<TokenPair> {
    let _commit = commit.lock();
    if epoch.load(Ordering::SeqCst) != started {
        debug!(target: "pantry::session", "discarding refresh that finished after logout");
        return None;
    }
    if let Err(e) = store::save_token_pair(secrets, &fresh) {
        warn!(target: "pantry::session", "refreshed tokens could not be stored: {}", e);
    }
    if epoch.load(Ordering::SeqCst) != started {
        debug!(target: "pantry::session", "logged out while storing refreshed tokens");
        return None;
    }
    info!(target: "pantry::session", "access token refreshed");
    Some(fresh)
}
