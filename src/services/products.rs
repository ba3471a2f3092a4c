use super::{segment, with_query};
use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{PagedList, Product, ProductCount};

pub struct ProductsService<'a> {
    api: &'a ApiClient,
}

impl<'a> ProductsService<'a> {
    pub const BASE: &'static str = "/products";

    pub fn new(api: &'a ApiClient) -> Self { Self { api } }

    pub async fn get_products_page(&self, group_id: &str, page: u32, size: u32, search: &str) -> ClientResult<PagedList<Product>> {
        let page = page.to_string();
        let size = size.to_string();
        let path = with_query(Self::BASE, &[("page", page.as_str()), ("size", size.as_str()), ("groupId", group_id), ("search", search)]);
        self.api.get(&path).await
    }

    pub async fn update_product_count(&self, product_id: &str, count: i64) -> ClientResult<Product> {
        let path = format!("{}/{}/count", Self::BASE, segment(product_id));
        self.api.patch(&path, &ProductCount { count }).await
    }
}
