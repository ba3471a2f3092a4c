use super::segment;
use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::Group;

pub struct GroupsService<'a> {
    api: &'a ApiClient,
}

impl<'a> GroupsService<'a> {
    pub const BASE: &'static str = "/groups";

    pub fn new(api: &'a ApiClient) -> Self { Self { api } }

    /// Create a household group and make it the active one; the backend makes the
    /// creator its owner.
    pub async fn create_group(&self, group: &Group) -> ClientResult<Group> {
        let created: Group = self.api.post(Self::BASE, group).await?;
        self.api.session().set_group_id(Some(created.id.as_str()))?;
        Ok(created)
    }

    pub async fn get_group(&self, group_id: &str) -> ClientResult<Group> {
        self.api.get(&format!("{}/{}", Self::BASE, segment(group_id))).await
    }

    pub async fn update_group(&self, group_id: &str, group: &Group) -> ClientResult<Group> {
        self.api.put(&format!("{}/{}", Self::BASE, segment(group_id)), group).await
    }
}
