use std::collections::BTreeMap;

use reqwest::Client;
use serde::Deserialize;

use crate::config::SheetsConfig;
use crate::error::FetchError;
use crate::models::schedule::SheetData;
use crate::services::google_auth::{GoogleAuth, SHEETS_SCOPE};
use crate::services::upstream;

pub const SERVICE: &str = "google_sheets";

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: Option<SheetProperties>,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchValues {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// A1 range covering columns A–Z of a tab, with the tab name quoted.
fn tab_range(title: &str) -> String {
    format!("'{}'!A:Z", title.replace('\'', "''"))
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// First row is the header row; each following row maps header → cell.
/// Cells past the end of a short row are left out.
fn rows_to_records(values: Vec<Vec<serde_json::Value>>) -> Vec<BTreeMap<String, String>> {
    let mut rows = values.into_iter();
    let Some(headers) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = headers.iter().map(cell_text).collect();
    rows.map(|row| {
        headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !header.trim().is_empty())
            .map(|(header, value)| (header.clone(), cell_text(value)))
            .collect()
    })
    .collect()
}

pub struct SheetsService {
    client: Client,
    config: Option<SheetsConfig>,
    auth: Option<GoogleAuth>,
}

impl SheetsService {
    pub fn new(client: Client, config: Option<SheetsConfig>) -> Self {
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

    /// Every tab of the spreadsheet as header-keyed rows.
    pub async fn try_all_tabs(&self) -> Result<SheetData, FetchError> {
        let (Some(config), Some(auth)) = (self.config.as_ref(), self.auth.as_ref()) else {
            return Err(FetchError::NotConfigured("google sheets"));
        };
        let token = auth.access_token(SHEETS_SCOPE).await?;
        let base = format!(
            "{}/spreadsheets/{}",
            config.api_url.trim_end_matches('/'),
            config.spreadsheet_id
        );

        let response = self
            .client
            .get(&base)
            .bearer_auth(&token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = upstream::read_json(SERVICE, response).await?;
        let titles: Vec<String> = meta
            .sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties?.title)
            .collect();
        if titles.is_empty() {
            return Ok(SheetData::new());
        }

        let mut query: Vec<(&str, String)> = titles.iter().map(|t| ("ranges", tab_range(t))).collect();
        query.push(("majorDimension", "ROWS".into()));
        let response = self
            .client
            .get(format!("{base}/values:batchGet"))
            .bearer_auth(&token)
            .query(&query)
            .send()
            .await?;
        let batch: BatchValues = upstream::read_json(SERVICE, response).await?;
        if batch.value_ranges.len() != titles.len() {
            return Err(FetchError::malformed(
                SERVICE,
                format!("asked for {} ranges, got {}", titles.len(), batch.value_ranges.len()),
            ));
        }

        Ok(titles
            .into_iter()
            .zip(batch.value_ranges)
            .map(|(title, range)| (title, rows_to_records(range.values)))
            .collect())
    }

    pub async fn all_tabs(&self) -> SheetData {
        upstream::or_default(SERVICE, self.try_all_tabs().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::google_auth::tests::{test_key, token_router};
    use crate::services::upstream::test_support::serve;
    use axum::{extract::RawQuery, http::StatusCode, routing::get, Json};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn service(base: &str) -> SheetsService {
        SheetsService::new(
            Client::new(),
            Some(SheetsConfig {
                spreadsheet_id: "sheet-1".into(),
                credentials: test_key(&format!("{base}/token")),
                api_url: base.into(),
            }),
        )
    }

    #[test]
    fn tab_names_are_quoted_in_ranges() {
        assert_eq!(tab_range("Girls Volleyball"), "'Girls Volleyball'!A:Z");
        assert_eq!(tab_range("St. Pat's"), "'St. Pat''s'!A:Z");
    }

    #[test]
    fn header_row_keys_the_remaining_rows() {
        let records = rows_to_records(vec![
            vec![json!("Date"), json!("Opponent"), json!("")],
            vec![json!("06/15/2024"), json!("Trinity"), json!("ignored")],
            vec![json!("06/20/2024")],
            vec![json!(45458), json!(null)],
        ]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("Opponent").map(String::as_str), Some("Trinity"));
        assert_eq!(records[0].len(), 2);
        assert!(records[1].get("Opponent").is_none());
        assert_eq!(records[2].get("Date").map(String::as_str), Some("45458"));
        assert!(rows_to_records(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn unconfigured_service_does_not_touch_the_network() {
        let sheets = SheetsService::new(Client::new(), None);
        assert!(matches!(
            sheets.try_all_tabs().await,
            Err(FetchError::NotConfigured(_))
        ));
        assert!(sheets.all_tabs().await.is_empty());
    }

    #[tokio::test]
    async fn reads_every_tab_in_one_batch() {
        let router = token_router(Arc::new(AtomicUsize::new(0)))
            .route(
                "/spreadsheets/sheet-1",
                get(|| async {
                    Json(json!({ "sheets": [
                        { "properties": { "title": "Volleyball" } },
                        { "properties": { "title": "Golf" } }
                    ]}))
                }),
            )
            .route(
                "/spreadsheets/sheet-1/values:batchGet",
                get(|RawQuery(query): RawQuery| async move {
                    let query = query.unwrap_or_default();
                    assert!(query.contains("ranges="));
                    Json(json!({ "valueRanges": [
                        { "range": "Volleyball!A1:Z3", "values": [
                            ["Date", "Opponent"],
                            ["06/15/2024", "Trinity"]
                        ]},
                        { "range": "Golf!A1:Z1" }
                    ]}))
                }),
            );
        let sheets = service(&serve(router).await);

        let data = sheets.all_tabs().await;
        assert_eq!(data.len(), 2);
        assert_eq!(data["Volleyball"][0]["Opponent"], "Trinity");
        assert!(data["Golf"].is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_falls_back_to_no_tabs() {
        let router = token_router(Arc::new(AtomicUsize::new(0))).route(
            "/spreadsheets/sheet-1",
            get(|| async { (StatusCode::FORBIDDEN, "caller does not have permission") }),
        );
        let sheets = service(&serve(router).await);

        assert!(matches!(
            sheets.try_all_tabs().await,
            Err(FetchError::Upstream { status: StatusCode::FORBIDDEN, .. })
        ));
        assert!(sheets.all_tabs().await.is_empty());
    }
}
