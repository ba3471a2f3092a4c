//! Thin pass-through wrappers over the backend's resource endpoints.
//! Each borrows the `ApiClient`, so every call goes through the token check.

mod products;
mod recipes;
mod users;
mod groups;
mod devices;

pub use products::ProductsService;
pub use recipes::RecipesService;
pub use users::UsersService;
pub use groups::GroupsService;
pub use devices::DevicesService;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// `base?k1=v1&k2=v2` with every value percent-encoded.
pub(crate) fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return base.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", base, query)
}

/// Percent-encode one path segment (ids and role names come from user input).
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_are_encoded() {
        assert_eq!(
            with_query("/products", &[("page", "1"), ("search", "green tea & honey")]),
            "/products?page=1&search=green%20tea%20%26%20honey"
        );
        assert_eq!(with_query("/groups", &[]), "/groups");
    }

    #[test]
    fn segments_are_encoded() {
        assert_eq!(segment("+380 50"), "%2B380%2050");
        assert_eq!(segment("olena@example.com"), "olena%40example.com");
    }
}
