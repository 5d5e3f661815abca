//! Profile handlers.

use std::path::Path;

use anyhow::{Context, Result};
use tabs_client::api::profile::{self, PictureUpload, ProfileUpdate};
use tabs_client::client::ApiClient;
use tabs_client::error::ApiError;

pub async fn show(client: &ApiClient) -> Result<()> {
    let p = profile::get(client).await?;

    println!("Username:  {}", p.username);
    println!("Email:     {}", p.email);
    println!("Full name: {}", p.full_name);
    println!("Gender:    {}", p.gender);
    if let Some(picture) = &p.profile_picture {
        println!("Picture:   {picture}");
    }
    Ok(())
}

pub async fn update(
    client: &ApiClient,
    username: Option<String>,
    full_name: Option<String>,
    gender: Option<String>,
    picture: Option<String>,
) -> Result<()> {
    let picture = picture.map(|path| read_picture(Path::new(&path))).transpose()?;

    let update = ProfileUpdate {
        username,
        full_name,
        gender,
        picture,
    };
    if update.is_empty() {
        return Err(ApiError::Validation("Nothing to update".to_string()).into());
    }

    let p = profile::update(client, &update).await?;
    println!("Profile updated for {}.", p.username);
    Ok(())
}

fn read_picture(path: &Path) -> Result<PictureUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read picture {}", path.display()))?;
    let filename = path
        .file_name()
        .map_or_else(|| "picture".to_string(), |n| n.to_string_lossy().to_string());
    Ok(PictureUpload { filename, bytes })
}
