use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::ContentfulConfig;
use crate::error::FetchError;
use crate::models::announcement::{Announcement, AnnouncementCategory};
use crate::models::media::GalleryItem;
use crate::models::rich_text::RichTextNode;
use crate::models::sports::{Game, HomeAway, SportsTicker, Team};
use crate::services::upstream;

pub const ANNOUNCEMENTS: &str = "contentful_announcements";
pub const SPORTS_TICKER: &str = "contentful_sports_ticker";
pub const PHOTO_GALLERY: &str = "contentful_gallery";

const ANNOUNCEMENT_QUERY: &str = r#"
  query GetAnnouncements($now: DateTime!) {
    announcementCollection(
      where: {
        publishDate_lte: $now,
        OR: [{ unpublishDate_gt: $now }, { unpublishDate_exists: false }]
      },
      order: [publishDate_DESC]
    ) {
      items {
        sys { id }
        headline
        announcementType
        eyebrowText
        publishDate
        unpublishDate
        description { json }
      }
    }
  }
"#;

const SPORTS_TICKER_QUERY: &str = r#"
  query GetSportsTicker {
    sportsTickerCollection(limit: 1) {
      items {
        sys { id }
        teamsCollection {
          items {
            sys { id }
            team
            gamesCollection {
              items {
                __typename
                ... on Game { sys { id } opponent location scsScore opponentScore date }
                ... on Meet { sys { id } date place }
              }
            }
          }
        }
      }
    }
  }
"#;

const PHOTO_GALLERY_QUERY: &str = r#"
  query GetPhotoGallery {
    galleryCollection(limit: 1) {
      items {
        galleryItemsCollection {
          items {
            ... on GalleryItem { media { url title } }
          }
        }
      }
    }
  }
"#;

// ─── GraphQL wire types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Unresolvable links (e.g. an unpublished entry) come back as `null` items.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<T>>,
}

impl<T> Collection<T> {
    fn into_items(self) -> impl Iterator<Item = T> {
        self.items.into_iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
struct Sys {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnouncementData {
    announcement_collection: Collection<AnnouncementItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnouncementItem {
    sys: Sys,
    headline: Option<String>,
    announcement_type: Option<String>,
    eyebrow_text: Option<String>,
    publish_date: Option<DateTime<FixedOffset>>,
    unpublish_date: Option<DateTime<FixedOffset>>,
    description: Option<RichTextField>,
}

#[derive(Debug, Deserialize)]
struct RichTextField {
    json: RichTextNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SportsTickerData {
    sports_ticker_collection: Collection<TickerItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerItem {
    sys: Sys,
    teams_collection: Option<Collection<TeamItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamItem {
    sys: Sys,
    team: Option<String>,
    games_collection: Option<Collection<GameItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameItem {
    sys: Sys,
    opponent: Option<String>,
    location: Option<String>,
    scs_score: Option<Scalar>,
    opponent_score: Option<Scalar>,
    date: Option<String>,
    place: Option<u32>,
}

/// Scores are free-form fields that may be typed as text or number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GalleryData {
    gallery_collection: Collection<GalleryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GalleryEntry {
    gallery_items_collection: Option<Collection<GalleryItemEntry>>,
}

#[derive(Debug, Deserialize)]
struct GalleryItemEntry {
    media: Option<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    url: Option<String>,
    title: Option<String>,
}

/// Contentful asset URLs are protocol-relative (`//images.ctfassets.net/...`).
fn absolute_asset_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

// ─── Service ────────────────────────────────────────────────────────────────

pub struct ContentfulService {
    client: Client,
    config: Option<ContentfulConfig>,
}

impl ContentfulService {
    pub fn new(client: Client, config: Option<ContentfulConfig>) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn query<T: DeserializeOwned>(
        &self,
        service: &'static str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, FetchError> {
        let config = self
            .config
            .as_ref()
            .ok_or(FetchError::NotConfigured("contentful"))?;

        let response = self
            .client
            .post(config.endpoint())
            .bearer_auth(&config.delivery_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let body: GraphQlResponse<T> = upstream::read_json(service, response).await?;

        let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
        match body.data {
            Some(data) => {
                if !messages.is_empty() {
                    tracing::warn!("{} returned partial data: {}", service, messages.join("; "));
                }
                Ok(data)
            }
            None => Err(FetchError::malformed(
                service,
                format!("no data ({})", messages.join("; ")),
            )),
        }
    }

    /// Announcements live at `now`, newest publish date first.
    pub async fn try_announcements(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<Announcement>, FetchError> {
        let data: AnnouncementData = self
            .query(ANNOUNCEMENTS, ANNOUNCEMENT_QUERY, json!({ "now": now.to_rfc3339() }))
            .await?;

        let announcements = data
            .announcement_collection
            .into_items()
            .filter_map(|item| {
                let (Some(headline), Some(publish_date)) = (item.headline, item.publish_date) else {
                    tracing::debug!("Skipping incomplete announcement {}", item.sys.id);
                    return None;
                };
                Some(Announcement {
                    id: item.sys.id,
                    eyebrow_text: item.eyebrow_text.filter(|s| !s.trim().is_empty()),
                    headline,
                    category: AnnouncementCategory::from(item.announcement_type.as_deref().unwrap_or_default()),
                    body: item.description.map(|d| d.json).filter(|doc| !doc.is_empty()),
                    publish_date,
                    unpublish_date: item.unpublish_date,
                })
            })
            .filter(|announcement| announcement.is_live_at(now))
            .collect();
        Ok(announcements)
    }

    pub async fn announcements(&self, now: DateTime<FixedOffset>) -> Vec<Announcement> {
        upstream::or_default(ANNOUNCEMENTS, self.try_announcements(now).await)
    }

    /// The first sports ticker entry, or `None` when none is published.
    pub async fn try_sports_ticker(&self) -> Result<Option<SportsTicker>, FetchError> {
        let data: SportsTickerData = self
            .query(SPORTS_TICKER, SPORTS_TICKER_QUERY, json!({}))
            .await?;

        let Some(ticker) = data.sports_ticker_collection.into_items().next() else {
            return Ok(None);
        };

        let teams = ticker
            .teams_collection
            .into_iter()
            .flat_map(Collection::into_items)
            .map(|team| Team {
                id: team.sys.id,
                name: team.team.unwrap_or_default(),
                games: team
                    .games_collection
                    .into_iter()
                    .flat_map(Collection::into_items)
                    .map(|game| Game {
                        id: game.sys.id,
                        opponent: game.opponent.filter(|s| !s.trim().is_empty()),
                        location: game.location.as_deref().and_then(HomeAway::parse),
                        scs_score: game.scs_score.and_then(Scalar::into_text),
                        opponent_score: game.opponent_score.and_then(Scalar::into_text),
                        date: game.date.unwrap_or_default(),
                        place: game.place,
                    })
                    .collect(),
            })
            .collect();

        Ok(Some(SportsTicker {
            id: ticker.sys.id,
            teams,
        }))
    }

    pub async fn sports_ticker(&self) -> Option<SportsTicker> {
        upstream::or_default(SPORTS_TICKER, self.try_sports_ticker().await)
    }

    /// Ordered media of the first gallery.
    pub async fn try_photo_gallery(&self) -> Result<Vec<GalleryItem>, FetchError> {
        let data: GalleryData = self
            .query(PHOTO_GALLERY, PHOTO_GALLERY_QUERY, json!({}))
            .await?;

        let items = data
            .gallery_collection
            .into_items()
            .next()
            .and_then(|gallery| gallery.gallery_items_collection)
            .into_iter()
            .flat_map(Collection::into_items)
            .filter_map(|item| {
                let media = item.media?;
                Some(GalleryItem {
                    url: absolute_asset_url(&media.url?),
                    title: media.title.unwrap_or_default(),
                })
            })
            .collect();
        Ok(items)
    }

    pub async fn photo_gallery(&self) -> Vec<GalleryItem> {
        upstream::or_default(PHOTO_GALLERY, self.try_photo_gallery().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::upstream::test_support::serve;
    use axum::{http::StatusCode, routing::post, Json, Router};

    const ENDPOINT: &str = "/spaces/space-1/environments/master";

    fn service(base: &str) -> ContentfulService {
        ContentfulService::new(
            Client::new(),
            Some(ContentfulConfig {
                space_id: "space-1".into(),
                delivery_token: "token".into(),
                environment: "master".into(),
                graphql_url: base.into(),
            }),
        )
    }

    async fn stub(body: serde_json::Value) -> ContentfulService {
        let router = Router::new().route(ENDPOINT, post(move || async move { Json(body) }));
        service(&serve(router).await)
    }

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-06-10T08:00:00-05:00").unwrap()
    }

    #[tokio::test]
    async fn unconfigured_service_returns_empty_values() {
        let contentful = ContentfulService::new(Client::new(), None);
        assert!(!contentful.is_configured());
        assert!(matches!(
            contentful.try_announcements(now()).await,
            Err(FetchError::NotConfigured(_))
        ));
        assert!(contentful.announcements(now()).await.is_empty());
        assert!(contentful.sports_ticker().await.is_none());
        assert!(contentful.photo_gallery().await.is_empty());
    }

    #[tokio::test]
    async fn upstream_error_status_falls_back_to_empty() {
        let router = Router::new().route(
            ENDPOINT,
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid token") }),
        );
        let contentful = service(&serve(router).await);

        match contentful.try_announcements(now()).await {
            Err(FetchError::Upstream { status, body, .. }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "invalid token");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
        assert!(contentful.announcements(now()).await.is_empty());
        assert!(contentful.sports_ticker().await.is_none());
    }

    #[tokio::test]
    async fn graphql_errors_without_data_are_malformed() {
        let contentful = stub(json!({ "data": null, "errors": [{ "message": "Unknown field" }] })).await;
        assert!(matches!(
            contentful.try_photo_gallery().await,
            Err(FetchError::Malformed { .. })
        ));
        assert!(contentful.photo_gallery().await.is_empty());
    }

    #[tokio::test]
    async fn announcements_are_mapped_and_incomplete_items_skipped() {
        let contentful = stub(json!({
            "data": {
                "announcementCollection": {
                    "items": [
                        {
                            "sys": { "id": "a1" },
                            "headline": "Spirit Week",
                            "announcementType": "School",
                            "eyebrowText": "This week",
                            "publishDate": "2024-06-09T00:00:00.000-05:00",
                            "unpublishDate": null,
                            "description": { "json": {
                                "nodeType": "document",
                                "content": [{ "nodeType": "paragraph", "content": [
                                    { "nodeType": "text", "value": "Wear green!", "marks": [] }
                                ]}]
                            }}
                        },
                        null,
                        { "sys": { "id": "a2" }, "headline": null, "publishDate": "2024-06-09T00:00:00Z" },
                        {
                            "sys": { "id": "a3" },
                            "headline": "Regionals",
                            "announcementType": "Athletics",
                            "eyebrowText": " ",
                            "publishDate": "2024-06-08T00:00:00Z",
                            "unpublishDate": "2024-06-30T00:00:00Z",
                            "description": null
                        }
                    ]
                }
            }
        }))
        .await;

        let announcements = contentful.announcements(now()).await;
        let ids: Vec<_> = announcements.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a3"]);
        assert_eq!(announcements[0].category, AnnouncementCategory::School);
        assert!(announcements[0].body.is_some());
        assert_eq!(announcements[1].category, AnnouncementCategory::Athletics);
        assert_eq!(announcements[1].eyebrow_text, None);
    }

    #[tokio::test]
    async fn sports_ticker_flattens_games_and_meets() {
        let contentful = stub(json!({
            "data": { "sportsTickerCollection": { "items": [{
                "sys": { "id": "t1" },
                "teamsCollection": { "items": [{
                    "sys": { "id": "team-1" },
                    "team": "Volleyball",
                    "gamesCollection": { "items": [
                        { "__typename": "Game", "sys": { "id": "g1" }, "opponent": "Trinity",
                          "location": "Home", "scsScore": 3, "opponentScore": "1",
                          "date": "2024-06-11T16:30:00.000-05:00" },
                        { "__typename": "Meet", "sys": { "id": "m1" },
                          "date": "2024-06-12T09:00:00.000-05:00", "place": 2 }
                    ]}
                }]}
            }]}}
        }))
        .await;

        let ticker = contentful.sports_ticker().await.unwrap();
        assert_eq!(ticker.id, "t1");
        let team = &ticker.teams[0];
        assert_eq!(team.name, "Volleyball");
        assert_eq!(team.games[0].location, Some(HomeAway::Home));
        assert_eq!(team.games[0].scs_score.as_deref(), Some("3"));
        assert_eq!(team.games[0].opponent_score.as_deref(), Some("1"));
        assert_eq!(team.games[1].place, Some(2));
        assert!(team.games[1].opponent.is_none());
    }

    #[tokio::test]
    async fn empty_ticker_collection_is_none() {
        let contentful = stub(json!({ "data": { "sportsTickerCollection": { "items": [] } } })).await;
        assert!(contentful.try_sports_ticker().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn gallery_urls_are_made_absolute() {
        let contentful = stub(json!({
            "data": { "galleryCollection": { "items": [{
                "galleryItemsCollection": { "items": [
                    { "media": { "url": "//images.ctfassets.net/x/game.jpg", "title": "Senior night" } },
                    { "media": null },
                    { "media": { "url": "https://cdn.example.org/band.png", "title": null } }
                ]}
            }]}}
        }))
        .await;

        let gallery = contentful.photo_gallery().await;
        assert_eq!(
            gallery,
            vec![
                GalleryItem {
                    url: "https://images.ctfassets.net/x/game.jpg".into(),
                    title: "Senior night".into(),
                },
                GalleryItem {
                    url: "https://cdn.example.org/band.png".into(),
                    title: String::new(),
                },
            ]
        );
    }
}
