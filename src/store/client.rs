use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, warn};

use crate::config::Settings;
use crate::TARGET_STORE;

/// Thin HTTP client for the tabular datastore's records API.
/// Authenticates with the `xc-token` header.
pub struct TableClient {
    http: Client,
    base: String,
    token: String,
}

impl TableClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build the datastore HTTP client")?;
        Ok(TableClient {
            http,
            base: settings.store_base.trim_end_matches('/').to_string(),
            token: settings.store_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn columns(&self, table_id: &str) -> Result<Value> {
        let res = self
            .http
            .get(self.url(&format!("/tables/{table_id}/columns")))
            .header("xc-token", &self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn list_records(&self, table_id: &str, limit: u32, offset: u32) -> Result<Value> {
        let res = self
            .http
            .get(self.url(&format!("/tables/{table_id}/records")))
            .header("xc-token", &self.token)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn create_record(&self, table_id: &str, payload: &Value) -> Result<Value> {
        let res = self
            .http
            .post(self.url(&format!("/tables/{table_id}/records")))
            .header("xc-token", &self.token)
            .json(payload)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(target: TARGET_STORE, "create error {}: {}", status, body);
            bail!("datastore create failed with status {status}");
        }
        Ok(res.json().await?)
    }

    pub async fn patch_record(&self, table_id: &str, row_id: i64, payload: &Value) -> Result<Value> {
        let res = self
            .http
            .patch(self.url(&format!("/tables/{table_id}/records/{row_id}")))
            .header("xc-token", &self.token)
            .json(payload)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(target: TARGET_STORE, "patch error {}: {}", status, body);
            bail!("datastore patch failed with status {status}");
        }
        Ok(res.json().await?)
    }

    /// Associate requirement rows with a vacancy row under the named
    /// relation. The link API varies between datastore versions, so two
    /// strategies are tried in order; returns `true` when either succeeds.
    pub async fn link_requirements(
        &self,
        table_id: &str,
        rel_name: &str,
        row_id: i64,
        req_ids: &[i64],
    ) -> bool {
        // 1) PATCH the relation column directly
        let links: Vec<Value> = req_ids.iter().map(|id| json!({ "id": id })).collect();
        let mut payload = serde_json::Map::new();
        payload.insert(rel_name.to_string(), Value::Array(links));
        let payload = Value::Object(payload);
        match self
            .http
            .patch(self.url(&format!("/tables/{table_id}/records/{row_id}")))
            .header("xc-token", &self.token)
            .json(&payload)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => return true,
            Ok(res) => {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                warn!(target: TARGET_STORE, "link via PATCH failed {}: {}", status, body);
            }
            Err(err) => warn!(target: TARGET_STORE, "link via PATCH error: {}", err),
        }

        // 2) dedicated links endpoint
        let payload = json!({ "add": req_ids });
        match self
            .http
            .post(self.url(&format!(
                "/tables/{table_id}/records/{row_id}/links/{rel_name}"
            )))
            .header("xc-token", &self.token)
            .json(&payload)
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => true,
            Ok(res) => {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                warn!(target: TARGET_STORE, "link via /links failed {}: {}", status, body);
                false
            }
            Err(err) => {
                warn!(target: TARGET_STORE, "link via /links error: {}", err);
                false
            }
        }
    }
}
