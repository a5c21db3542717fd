//! Persistence collaborator — append-only rows into a shared Google Sheet.
//!
//! One row per completed scoring session, appended via the Sheets
//! `values:append` endpoint. Appends are independent and order-insensitive;
//! row order carries no meaning beyond the timestamp column. The
//! `RowAppender` trait is the seam handlers depend on; tests inject an
//! in-memory implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<SheetError> for AppError {
    fn from(e: SheetError) -> Self {
        AppError::Persistence(e.to_string())
    }
}

/// Append-only row sink. Implementations must confirm the write before
/// returning Ok — a session is only complete once its row is durable.
#[async_trait]
pub trait RowAppender: Send + Sync {
    async fn append_row(&self, row: &[String]) -> Result<(), SheetError>;
}

/// Google Sheets `values:append` client.
pub struct SheetsAppender {
    client: Client,
    spreadsheet_id: String,
    api_token: String,
    range: String,
}

impl SheetsAppender {
    pub fn new(spreadsheet_id: String, api_token: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            spreadsheet_id,
            api_token,
            range: "Sheet1".to_string(),
        }
    }

    fn append_url(&self) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}:append\
             ?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.spreadsheet_id, self.range
        )
    }
}

#[async_trait]
impl RowAppender for SheetsAppender {
    async fn append_row(&self, row: &[String]) -> Result<(), SheetError> {
        let response = self
            .client
            .post(self.append_url())
            .bearer_auth(&self.api_token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Sheets append rejected ({status}): {message}");
            return Err(SheetError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Appended {}-cell row to sheet", row.len());
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// In-memory appender for handler tests; optionally rejects every append
    /// to exercise the persistence-failure path.
    #[derive(Default)]
    pub struct MemoryAppender {
        pub rows: Mutex<Vec<Vec<String>>>,
        pub reject: bool,
    }

    #[async_trait]
    impl RowAppender for MemoryAppender {
        async fn append_row(&self, row: &[String]) -> Result<(), SheetError> {
            if self.reject {
                return Err(SheetError::Api {
                    status: 403,
                    message: "rejected by test".to_string(),
                });
            }
            self.rows
                .lock()
                .expect("memory appender lock poisoned")
                .push(row.to_vec());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_url_targets_spreadsheet_and_range() {
        let appender = SheetsAppender::new("sheet-123".to_string(), "token".to_string());
        let url = appender.append_url();
        assert!(url.contains("/spreadsheets/sheet-123/values/Sheet1:append"));
        assert!(url.contains("valueInputOption=RAW"));
    }

    #[tokio::test]
    async fn test_memory_appender_records_rows() {
        let appender = testing::MemoryAppender::default();
        appender
            .append_row(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(appender.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_appender_reject_surfaces_api_error() {
        let appender = testing::MemoryAppender {
            reject: true,
            ..Default::default()
        };
        let err = appender.append_row(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, SheetError::Api { status: 403, .. }));
    }
}
