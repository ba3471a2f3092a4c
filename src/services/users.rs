use super::{segment, with_query};
use crate::client::{ApiClient, HttpMethod, NO_BODY};
use crate::error::ClientResult;
use crate::models::{PagedList, User};

pub struct UsersService<'a> {
    api: &'a ApiClient,
}

impl<'a> UsersService<'a> {
    pub const BASE: &'static str = "/users";

    pub fn new(api: &'a ApiClient) -> Self { Self { api } }

    /// Look a user up by id, email or phone.
    pub async fn get_user(&self, identifier: &str) -> ClientResult<User> {
        self.api.get(&format!("{}/{}", Self::BASE, segment(identifier))).await
    }

    pub async fn get_users_page(&self, page: u32, size: u32) -> ClientResult<PagedList<User>> {
        let page = page.to_string();
        let size = size.to_string();
        self.api.get(&with_query(Self::BASE, &[("page", page.as_str()), ("size", size.as_str())])).await
    }

    pub async fn update_user(&self, user_id: &str, user: &User) -> ClientResult<User> {
        self.api.put(&format!("{}/{}", Self::BASE, segment(user_id)), user).await
    }

    pub async fn add_user_role(&self, user_id: &str, role_name: &str) -> ClientResult<User> {
        let path = format!("{}/{}/roles/{}", Self::BASE, segment(user_id), segment(role_name));
        self.api.request(HttpMethod::Post, &path, NO_BODY).await
    }

    pub async fn remove_user_role(&self, user_id: &str, role_name: &str) -> ClientResult<User> {
        let path = format!("{}/{}/roles/{}", Self::BASE, segment(user_id), segment(role_name));
        self.api.delete(&path).await
    }
}
