//! Profile read/update, including the multipart picture upload.

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiRequest, FormField, FormValue};
use crate::error::ApiResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Picture payload for the multipart upload.
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Partial profile update. Only the set fields are sent, matching the
/// backend's PATCH semantics.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub picture: Option<PictureUpload>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.full_name.is_none()
            && self.gender.is_none()
            && self.picture.is_none()
    }

    fn to_fields(&self) -> Vec<FormField> {
        let mut fields = Vec::new();
        if let Some(username) = &self.username {
            fields.push(text_field("username", username));
        }
        if let Some(full_name) = &self.full_name {
            fields.push(text_field("full_name", full_name));
        }
        if let Some(gender) = &self.gender {
            fields.push(text_field("gender", gender));
        }
        if let Some(picture) = &self.picture {
            fields.push(FormField {
                name: "profile_picture".to_string(),
                value: FormValue::File {
                    filename: picture.filename.clone(),
                    bytes: picture.bytes.clone(),
                },
            });
        }
        fields
    }
}

fn text_field(name: &str, value: &str) -> FormField {
    FormField {
        name: name.to_string(),
        value: FormValue::Text(value.to_string()),
    }
}

pub async fn get(client: &ApiClient) -> ApiResult<Profile> {
    client.execute(&ApiRequest::get("/auth/user/")).await
}

/// Applies a partial update; the backend echoes the updated profile.
pub async fn update(client: &ApiClient, update: &ProfileUpdate) -> ApiResult<Profile> {
    let request = ApiRequest::patch("/auth/user/").multipart(update.to_fields());
    client.execute(&request).await
}
