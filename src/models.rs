//! Wire models exchanged with the backend. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new<S: Into<String>>(access_token: S, refresh_token: S) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }

    /// Both halves present; an empty string never authenticates anything.
    pub fn is_usable(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductCount {
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ImageUploadState {
    #[default]
    Started,
    Uploaded,
    Failed,
}

impl TryFrom<i64> for ImageUploadState {
    type Error = String;
    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ImageUploadState::Started),
            1 => Ok(ImageUploadState::Uploaded),
            2 => Ok(ImageUploadState::Failed),
            other => Err(format!("unknown image upload state {}", other)),
        }
    }
}

impl From<ImageUploadState> for i64 {
    fn from(s: ImageUploadState) -> i64 {
        match s {
            ImageUploadState::Started => 0,
            ImageUploadState::Uploaded => 1,
            ImageUploadState::Failed => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageInfo {
    pub id: String,
    pub original_photo_guid: String,
    pub small_photo_guid: String,
    pub extension: String,
    pub md5_hash: String,
    pub image_upload_state: ImageUploadState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<ImageInfo>,
    pub text: String,
    pub ingredients: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Device kind as an integer on the wire. Unrecognised values read as `Unknown`
/// so API users are forced to set the type explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum DeviceType {
    #[default]
    Unknown,
    ProductsRecognizer,
}

impl From<i64> for DeviceType {
    fn from(v: i64) -> Self {
        match v {
            1 => DeviceType::ProductsRecognizer,
            _ => DeviceType::Unknown,
        }
    }
}

impl From<DeviceType> for i64 {
    fn from(t: DeviceType) -> i64 {
        match t {
            DeviceType::Unknown => 0,
            DeviceType::ProductsRecognizer => 1,
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Unknown => write!(f, "Unknown"),
            DeviceType::ProductsRecognizer => write!(f, "Products Recognizer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub guid: String,
    #[serde(default)]
    pub group_id: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub group_id: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCreateDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub guid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    pub total_pages: i64,
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_falls_back_to_unknown() {
        let d: Device = serde_json::from_str(
            r#"{"id":"d1","type":7,"guid":"g","isActive":true}"#,
        ).unwrap();
        assert_eq!(d.device_type, DeviceType::Unknown);
        assert_eq!(d.device_type.to_string(), "Unknown");
        let d: Device = serde_json::from_str(
            r#"{"id":"d1","name":"Fridge cam","type":1,"guid":"g","groupId":"grp","isActive":false}"#,
        ).unwrap();
        assert_eq!(d.device_type, DeviceType::ProductsRecognizer);
        assert_eq!(d.group_id.as_deref(), Some("grp"));
    }

    #[test]
    fn recipe_tolerates_sparse_payload() {
        let r: Recipe = serde_json::from_str(
            r#"{"id":"r1","name":"Soup","thumbnail":{"originalPhotoGuid":"o","extension":"jpg","imageUploadState":1},"ingredients":[{"id":"p1","name":"Salt","count":2}]}"#,
        ).unwrap();
        assert_eq!(r.text, "");
        assert_eq!(r.ingredients[0].count, 2);
        let thumb = r.thumbnail.unwrap();
        assert_eq!(thumb.image_upload_state, ImageUploadState::Uploaded);
        assert!(r.categories.is_empty());
    }

    #[test]
    fn unknown_image_upload_state_is_rejected() {
        let res: Result<ImageInfo, _> = serde_json::from_str(r#"{"imageUploadState":9}"#);
        assert!(res.is_err());
    }

    #[test]
    fn token_pair_uses_camel_case() {
        let pair = TokenPair::new("a", "r");
        assert_eq!(serde_json::to_string(&pair).unwrap(), r#"{"accessToken":"a","refreshToken":"r"}"#);
        assert!(!TokenPair::new("", "r").is_usable());
    }

    #[test]
    fn login_model_omits_absent_contacts() {
        let m = LoginModel { email: Some("a@b.c".into()), phone: None, password: "pw".into() };
        assert_eq!(serde_json::to_string(&m).unwrap(), r#"{"email":"a@b.c","password":"pw"}"#);
    }
}
