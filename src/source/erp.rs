use crate::config::ErpConfig;
use crate::model::{DateRange, SalesRecord, SourceError, StoreScope};
use crate::source::traits::SalesSource;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Sales accessor backed by the ERP's daily sales endpoint.
pub struct ErpSalesClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ErpSalesClient {
    pub fn new(cfg: &ErpConfig, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent("StorePulse/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    fn build_url(&self) -> String {
        format!("{}/sales", self.base_url)
    }

    fn build_query(scope: &StoreScope, range: &DateRange) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("from", range.start.format("%Y-%m-%d").to_string()),
            ("to", range.end.format("%Y-%m-%d").to_string()),
        ];
        if let Some(store_id) = scope.store_id() {
            query.push(("store_id", store_id.to_string()));
        }
        query
    }
}

#[async_trait::async_trait]
impl SalesSource for ErpSalesClient {
    async fn sales_counts(
        &self,
        scope: &StoreScope,
        range: &DateRange,
    ) -> Result<Vec<SalesRecord>, SourceError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.build_url();
        debug!("Requesting ERP sales {} for {} ({})", url, scope, range);

        let mut request = self.client.get(&url).query(&Self::build_query(scope, range));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SourceError::InvalidResponse(response.status().as_u16()));
        }

        Ok(response.json::<Vec<SalesRecord>>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn client(base_url: &str) -> ErpSalesClient {
        let cfg = ErpConfig {
            base_url: base_url.into(),
            api_key: None,
        };
        ErpSalesClient::new(&cfg, Duration::from_secs(1)).unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn builds_url_without_double_slash() {
        assert_eq!(client("http://erp.local/api/").build_url(), "http://erp.local/api/sales");
    }

    #[test]
    fn query_carries_store_only_when_scoped() {
        let all = ErpSalesClient::build_query(&StoreScope::All, &range());
        assert_eq!(
            all,
            vec![("from", "2024-01-01".to_string()), ("to", "2024-01-31".to_string())]
        );

        let one = ErpSalesClient::build_query(&StoreScope::Store("s1".into()), &range());
        assert_eq!(one.last(), Some(&("store_id", "s1".to_string())));
    }

    #[test]
    fn decodes_erp_rows_with_and_without_store() {
        let body = r#"[
            {"store_id": "s1", "date": "2024-01-02", "revenue": 5000.0, "order_count": 3},
            {"date": "2024-01-02T00:00:00Z", "revenue": 7000.0, "order_count": 5}
        ]"#;
        let rows: Vec<SalesRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(rows[0].store_id.as_deref(), Some("s1"));
        assert_eq!(rows[1].store_id, None);
        assert_eq!(rows[1].order_count, 5);
    }

    #[tokio::test]
    async fn unreachable_erp_is_an_error() {
        let erp = client("http://127.0.0.1:9");
        let result = erp.sales_counts(&StoreScope::All, &range()).await;
        assert!(matches!(result, Err(SourceError::HttpError(_))));
    }
}
