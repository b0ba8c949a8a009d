use reqwest::Client;
use serde::Deserialize;

use crate::config::DriveConfig;
use crate::error::FetchError;
use crate::models::media::DriveImage;
use crate::services::google_auth::{GoogleAuth, DRIVE_SCOPE};
use crate::services::upstream;

pub const SERVICE: &str = "google_drive";
const PAGE_SIZE: &str = "100";
// Folders are small; this only guards against a runaway page token loop.
const MAX_PAGES: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    web_content_link: Option<String>,
}

pub struct DriveService {
    client: Client,
    config: Option<DriveConfig>,
    auth: Option<GoogleAuth>,
}

impl DriveService {
    pub fn new(client: Client, config: Option<DriveConfig>) -> Self {
        let auth = config
            .as_ref()
            .map(|c| GoogleAuth::new(client.clone(), c.credentials.clone()));
        Self {
            client,
            config,
            auth,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Non-trashed images of the configured folder with their download links.
    pub async fn try_images(&self) -> Result<Vec<DriveImage>, FetchError> {
        let (Some(config), Some(auth)) = (self.config.as_ref(), self.auth.as_ref()) else {
            return Err(FetchError::NotConfigured("google drive"));
        };
        let token = auth.access_token(DRIVE_SCOPE).await?;
        let url = format!("{}/files", config.api_url.trim_end_matches('/'));
        let q = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            config.folder_id.replace('\'', "\\'")
        );

        let mut images = Vec::new();
        let mut page_token: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let mut query = vec![
                ("q", q.clone()),
                ("fields", "nextPageToken, files(id, name, webContentLink)".to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
            ];
            if let Some(page) = page_token.take() {
                query.push(("pageToken", page));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(&query)
                .send()
                .await?;
            let list: FileList = upstream::read_json(SERVICE, response).await?;
            images.extend(list.files.into_iter().map(|file| DriveImage {
                id: file.id,
                name: file.name,
                url: file.web_content_link,
            }));

            match list.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(images),
            }
        }
        tracing::warn!("Drive folder listing truncated after {} pages", MAX_PAGES);
        Ok(images)
    }

    pub async fn images(&self) -> Vec<DriveImage> {
        upstream::or_default(SERVICE, self.try_images().await)
    }
}
