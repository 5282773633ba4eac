//! Cloud billing collector: polls each configured provider's cost endpoint
//! and folds the answers into one payload with a cross-provider total and
//! optional daily history.

use crate::collector::Collector;
use crate::config::BillingProviderConfig;
use crate::error::PulseErr;
use crate::error::Result;
use crate::snapshot::BillingHistory;
use crate::snapshot::BillingPayload;
use crate::snapshot::BillingProvider;
use crate::snapshot::BillingTotal;
use crate::snapshot::COLLECTOR_BILLING;
use crate::snapshot::Payload;
use crate::snapshot::ProviderStatus;
use crate::snapshot::SpendPoint;
use chrono::NaiveDate;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Cost document each provider endpoint answers with. Unknown fields are
/// ignored so providers can grow their responses.
#[derive(Debug, Deserialize)]
struct CostResponse {
    current_month_usd: f64,
    forecast_usd: Option<f64>,
    previous_month_usd: Option<f64>,
    #[serde(default)]
    history: Vec<HistoryPointJson>,
}

#[derive(Debug, Deserialize)]
struct HistoryPointJson {
    date: NaiveDate,
    usd: f64,
}

pub struct BillingCollector {
    client: reqwest::Client,
    providers: Vec<BillingProviderConfig>,
    budget_usd: Option<f64>,
    interval: Duration,
}

impl BillingCollector {
    pub fn new(
        providers: Vec<BillingProviderConfig>,
        budget_usd: Option<f64>,
        interval: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            providers,
            budget_usd,
            interval,
        }
    }

    async fn poll_provider(
        &self,
        provider: &BillingProviderConfig,
    ) -> (BillingProvider, Vec<SpendPoint>) {
        let mut record = BillingProvider {
            label: provider.label.clone(),
            status: ProviderStatus::Error,
            current_month_usd: 0.0,
            forecast_usd: None,
            budget_usd: provider.budget_usd,
            previous_month_usd: None,
            dashboard_url: provider.dashboard_url.clone(),
        };
        let mut request = self.client.get(&provider.endpoint);
        if let Some(env) = &provider.api_key_env {
            match std::env::var(env) {
                Ok(key) if !key.is_empty() => request = request.bearer_auth(key),
                _ => {
                    record.status = ProviderStatus::AuthFailed;
                    return (record, Vec::new());
                }
            }
        }
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(provider = %provider.label, "cost request failed: {err}");
                return (record, Vec::new());
            }
        };
        match response.status() {
            status if status.is_success() => {}
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                record.status = ProviderStatus::AuthFailed;
                return (record, Vec::new());
            }
            status => {
                tracing::warn!(provider = %provider.label, "cost endpoint answered {status}");
                return (record, Vec::new());
            }
        }
        let cost: CostResponse = match response.json().await {
            Ok(cost) => cost,
            Err(err) => {
                tracing::warn!(provider = %provider.label, "cost payload unreadable: {err}");
                return (record, Vec::new());
            }
        };
        record.status = ProviderStatus::Ok;
        record.current_month_usd = cost.current_month_usd;
        record.forecast_usd = cost.forecast_usd;
        record.previous_month_usd = cost.previous_month_usd;
        let history = cost
            .history
            .into_iter()
            .map(|point| SpendPoint {
                date: point.date,
                usd: point.usd,
            })
            .collect();
        (record, history)
    }
}

impl Collector for BillingCollector {
    fn name(&self) -> &'static str {
        COLLECTOR_BILLING
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn collect(&self, cancel: CancellationToken) -> BoxFuture<'_, Result<Payload>> {
        Box::pin(async move {
            let mut providers = Vec::with_capacity(self.providers.len());
            let mut by_provider: BTreeMap<String, Vec<SpendPoint>> = BTreeMap::new();
            for provider in &self.providers {
                let (record, history) = tokio::select! {
                    _ = cancel.cancelled() => return Err(PulseErr::Cancelled),
                    polled = self.poll_provider(provider) => polled,
                };
                if !history.is_empty() {
                    by_provider.insert(record.label.clone(), history);
                }
                providers.push(record);
            }

            let current_usd = providers.iter().map(|p| p.current_month_usd).sum();
            let forecasts: Vec<f64> = providers.iter().filter_map(|p| p.forecast_usd).collect();
            let forecast_usd = (!forecasts.is_empty()).then(|| forecasts.iter().sum());

            // Daily totals across providers, aligned by date.
            let mut total_by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for history in by_provider.values() {
                for point in history {
                    *total_by_date.entry(point.date).or_default() += point.usd;
                }
            }
            let history = (!by_provider.is_empty()).then(|| BillingHistory {
                total: total_by_date
                    .into_iter()
                    .map(|(date, usd)| SpendPoint { date, usd })
                    .collect(),
                by_provider,
            });

            Ok(Payload::Billing(BillingPayload {
                providers,
                total: BillingTotal {
                    current_usd,
                    forecast_usd,
                    budget_usd: self.budget_usd,
                },
                history,
            }))
        })
    }
}
