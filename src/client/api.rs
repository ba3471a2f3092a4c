use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use super::dispatcher::{Dispatcher, HttpMethod, NO_BODY};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::identity::{SessionManager, SessionState};
use crate::models::{ImageInfo, LoginModel, RegisterModel, TokenPair, User};
use crate::services::{DevicesService, GroupsService, ProductsService, RecipesService, UsersService};
use crate::store::{PreferenceStore, SecretStore};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

/// Entry point for callers: every request first runs the session's token check,
/// then goes out signed with whatever access token that check left behind.
pub struct ApiClient {
    config: ClientConfig,
    dispatcher: Dispatcher,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        secrets: Arc<dyn SecretStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> ClientResult<Self> {
        let config = config.validated()?;
        let dispatcher = Dispatcher::new(&config)?;
        let session = SessionManager::new(dispatcher.clone(), secrets, preferences, config.expiry_leeway_secs);
        Ok(Self { config, dispatcher, session: Arc::new(session) })
    }

    pub fn config(&self) -> &ClientConfig { &self.config }

    pub fn session(&self) -> &Arc<SessionManager> { &self.session }

    pub fn products(&self) -> ProductsService<'_> { ProductsService::new(self) }
    pub fn recipes(&self) -> RecipesService<'_> { RecipesService::new(self) }
    pub fn users(&self) -> UsersService<'_> { UsersService::new(self) }
    pub fn groups(&self) -> GroupsService<'_> { GroupsService::new(self) }
    pub fn devices(&self) -> DevicesService<'_> { DevicesService::new(self) }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(HttpMethod::Get, path, NO_BODY).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(HttpMethod::Delete, path, NO_BODY).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.request(HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.request(HttpMethod::Put, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.request(HttpMethod::Patch, path, Some(body)).await
    }

    /// For endpoints whose success body the caller does not need.
    pub async fn send_no_content<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<()> {
        self.session.ensure_valid_token().await;
        let token = self.session.access_token();
        self.dispatcher.send_no_content(method, path, body, token.as_deref()).await
    }

    pub async fn request<B, T>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.session.ensure_valid_token().await;
        let token = self.session.access_token();
        self.dispatcher.send(method, path, body, token.as_deref()).await
    }

    /// Exchange credentials for a token pair and load the user's profile.
    /// Returns whether the profile lookup confirmed the session.
    pub async fn login(&self, model: &LoginModel) -> ClientResult<bool> {
        let pair: TokenPair = self.dispatcher.send(HttpMethod::Post, LOGIN_PATH, Some(model), None).await?;
        self.session.establish(&pair)?;
        info!(target: "pantry::client", "logged in");
        Ok(self.check_authentication().await)
    }

    pub async fn register(&self, model: &RegisterModel) -> ClientResult<bool> {
        let pair: TokenPair = self.dispatcher.send(HttpMethod::Post, REGISTER_PATH, Some(model), None).await?;
        self.session.establish(&pair)?;
        info!(target: "pantry::client", "registered");
        Ok(self.check_authentication().await)
    }

    /// Startup check: make sure the token is live, then read the user's profile to
    /// learn which household group they belong to. Failures only log and yield `false`.
    pub async fn check_authentication(&self) -> bool {
        if self.session.ensure_valid_token().await != SessionState::Valid {
            return false;
        }
        let claims = self.session.claims();
        let Some(identifier) = claims.lookup_identifier() else {
            warn!(target: "pantry::client", "token carries neither email nor phone; cannot load profile");
            return false;
        };
        let user: User = match self.users().get_user(identifier).await {
            Ok(u) => u,
            Err(e) => {
                warn!(target: "pantry::client", "profile lookup failed: {}", e);
                return false;
            }
        };
        if let Err(e) = self.session.set_group_id(user.group_id.as_deref()) {
            warn!(target: "pantry::client", "cannot persist active group: {}", e);
        }
        true
    }

    /// Make sure a live token is available, refreshing if needed.
    pub async fn require_session(&self) -> ClientResult<()> {
        match self.session.ensure_valid_token().await {
            SessionState::Valid => Ok(()),
            state => {
                warn!(target: "pantry::client", "no usable session ({:?})", state);
                Err(ClientError::Unauthenticated)
            }
        }
    }

    pub fn logout(&self) -> ClientResult<()> { self.session.logout() }

    pub fn image_url(&self, image: &ImageInfo) -> String { self.config.image_url(image) }
}
