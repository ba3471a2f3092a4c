use super::{segment, with_query};
use crate::client::{ApiClient, HttpMethod, NO_BODY};
use crate::error::ClientResult;
use crate::models::{PagedList, Recipe};

pub struct RecipesService<'a> {
    api: &'a ApiClient,
}

impl<'a> RecipesService<'a> {
    pub const BASE: &'static str = "/recipes";

    pub fn new(api: &'a ApiClient) -> Self { Self { api } }

    pub async fn get_recipes_page(&self, group_id: &str, page: u32, size: u32, search: &str) -> ClientResult<PagedList<Recipe>> {
        let page = page.to_string();
        let size = size.to_string();
        let path = with_query(Self::BASE, &[("page", page.as_str()), ("size", size.as_str()), ("groupId", group_id), ("search", search)]);
        self.api.get(&path).await
    }

    pub async fn get_recipe(&self, recipe_id: &str) -> ClientResult<Recipe> {
        self.api.get(&format!("{}/{}", Self::BASE, segment(recipe_id))).await
    }

    /// Mark a recipe as cooked; the backend deducts its ingredients from the pantry.
    pub async fn cook_recipe(&self, recipe_id: &str) -> ClientResult<()> {
        let path = format!("{}/{}/cook", Self::BASE, segment(recipe_id));
        self.api.send_no_content(HttpMethod::Patch, &path, NO_BODY).await
    }
}
