//! Local persistence seams: secrets (the token pair) and plain preferences (active group).
//! The platform keychain is out of reach of this crate; callers hand in whatever
//! implementation fits, and the library ships an in-memory and a JSON-file one.

mod memory;
mod file;

pub use memory::MemoryStore;
pub use file::JsonFileStore;

use crate::error::ClientResult;
use crate::models::TokenPair;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const GROUP_ID_KEY: &str = "groupId";

pub trait SecretStore: Send + Sync {
    fn get_secret(&self, key: &str) -> ClientResult<Option<String>>;
    fn set_secret(&self, key: &str, value: &str) -> ClientResult<()>;
    /// Deleting a missing key is not an error.
    fn delete_secret(&self, key: &str) -> ClientResult<()>;

    /// Write several secrets as one update. Implementations that can persist
    /// them together should override this.
    fn set_secrets(&self, entries: &[(&str, &str)]) -> ClientResult<()> {
        for (k, v) in entries {
            self.set_secret(k, v)?;
        }
        Ok(())
    }
}

pub trait PreferenceStore: Send + Sync {
    fn get_preference(&self, key: &str) -> ClientResult<Option<String>>;
    fn set_preference(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove_preference(&self, key: &str) -> ClientResult<()>;
}

/// Read the stored pair; both halves must be present.
pub fn load_token_pair(store: &dyn SecretStore) -> ClientResult<Option<TokenPair>> {
    let access = store.get_secret(ACCESS_TOKEN_KEY)?;
    let refresh = store.get_secret(REFRESH_TOKEN_KEY)?;
    Ok(match (access, refresh) {
        (Some(a), Some(r)) => Some(TokenPair { access_token: a, refresh_token: r }),
        _ => None,
    })
}

pub fn save_token_pair(store: &dyn SecretStore, pair: &TokenPair) -> ClientResult<()> {
    store.set_secrets(&[
        (ACCESS_TOKEN_KEY, pair.access_token.as_str()),
        (REFRESH_TOKEN_KEY, pair.refresh_token.as_str()),
    ])
}

pub fn clear_token_pair(store: &dyn SecretStore) -> ClientResult<()> {
    store.delete_secret(ACCESS_TOKEN_KEY)?;
    store.delete_secret(REFRESH_TOKEN_KEY)
}
