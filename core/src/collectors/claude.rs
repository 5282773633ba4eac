//! Quota collector for Anthropic subscription and API accounts.
//!
//! Each configured account resolves a bearer token (an env var for API
//! accounts, the OAuth credentials file for subscription accounts) and
//! polls the usage endpoint. Transport and auth problems degrade to a
//! per-account status instead of failing the whole payload, so one broken
//! account never hides the others.

use crate::collector::Collector;
use crate::config::AccountConfig;
use crate::error::PulseErr;
use crate::error::Result;
use crate::snapshot::AccountKind;
use crate::snapshot::AccountStatus;
use crate::snapshot::COLLECTOR_CLAUDE;
use crate::snapshot::ExtraUsage;
use crate::snapshot::Payload;
use crate::snapshot::QuotaAccount;
use crate::snapshot::QuotaPayload;
use crate::snapshot::RateLimitWindow;
use crate::snapshot::UsageWindow;
use chrono::DateTime;
use chrono::Utc;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const USAGE_PATH: &str = "/api/oauth/usage";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shape of the usage endpoint response. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct UsageResponse {
    five_hour: Option<UsageWindowJson>,
    seven_day: Option<UsageWindowJson>,
    rate_limit: Option<RateLimitJson>,
    extra_usage: Option<ExtraUsageJson>,
}

#[derive(Debug, Deserialize)]
struct UsageWindowJson {
    utilization: f64,
    resets_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RateLimitJson {
    requests_remaining: u64,
    requests_limit: u64,
    tokens_remaining: u64,
    tokens_limit: u64,
}

#[derive(Debug, Deserialize)]
struct ExtraUsageJson {
    used_usd: f64,
    cap_usd: f64,
}

/// Subset of `~/.claude/.credentials.json` we need.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(rename = "claudeAiOauth")]
    oauth: Option<OauthCredentials>,
}

#[derive(Debug, Deserialize)]
struct OauthCredentials {
    #[serde(rename = "accessToken")]
    access_token: String,
}

pub struct ClaudeCollector {
    client: reqwest::Client,
    accounts: Vec<AccountConfig>,
    interval: Duration,
}

impl ClaudeCollector {
    pub fn new(accounts: Vec<AccountConfig>, interval: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            accounts,
            interval,
        }
    }

    async fn collect_account(&self, account: &AccountConfig) -> QuotaAccount {
        let kind = if account.is_api {
            AccountKind::Api
        } else {
            AccountKind::Subscription
        };
        let mut record = QuotaAccount {
            label: account.label.clone(),
            kind,
            status: AccountStatus::Error,
            five_hour: None,
            seven_day: None,
            rate_limit: None,
            extra_usage: None,
        };
        let Some(token) = resolve_token(account) else {
            record.status = AccountStatus::AuthFailed;
            return record;
        };

        let base = account.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let url = format!("{}{USAGE_PATH}", base.trim_end_matches('/'));
        let response = match self.client.get(&url).bearer_auth(&token).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(account = %account.label, "usage request failed: {err}");
                return record;
            }
        };
        match response.status() {
            status if status.is_success() => {}
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                record.status = AccountStatus::AuthFailed;
                return record;
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                record.status = AccountStatus::RateLimited;
                return record;
            }
            status => {
                tracing::warn!(account = %account.label, "usage endpoint answered {status}");
                return record;
            }
        }
        let usage: UsageResponse = match response.json().await {
            Ok(usage) => usage,
            Err(err) => {
                tracing::warn!(account = %account.label, "usage payload unreadable: {err}");
                return record;
            }
        };

        record.status = AccountStatus::Ok;
        record.five_hour = usage.five_hour.map(UsageWindowJson::into_window);
        record.seven_day = usage.seven_day.map(UsageWindowJson::into_window);
        record.rate_limit = usage.rate_limit.map(|rl| RateLimitWindow {
            requests_remaining: rl.requests_remaining,
            requests_limit: rl.requests_limit,
            tokens_remaining: rl.tokens_remaining,
            tokens_limit: rl.tokens_limit,
        });
        record.extra_usage = usage.extra_usage.map(|extra| ExtraUsage {
            used_usd: extra.used_usd,
            cap_usd: extra.cap_usd,
        });
        record
    }
}

impl UsageWindowJson {
    fn into_window(self) -> UsageWindow {
        UsageWindow {
            used_percent: self.utilization,
            resets_at: self.resets_at,
        }
    }
}

impl Collector for ClaudeCollector {
    fn name(&self) -> &'static str {
        COLLECTOR_CLAUDE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn collect(&self, cancel: CancellationToken) -> BoxFuture<'_, Result<Payload>> {
        Box::pin(async move {
            let mut accounts = Vec::with_capacity(self.accounts.len());
            for account in &self.accounts {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(PulseErr::Cancelled),
                    record = self.collect_account(account) => accounts.push(record),
                }
            }
            Ok(Payload::Quota(QuotaPayload::new(accounts)))
        })
    }
}

fn resolve_token(account: &AccountConfig) -> Option<String> {
    if let Some(env) = &account.api_key_env {
        return std::env::var(env).ok().filter(|token| !token.is_empty());
    }
    let path = account
        .credentials_file
        .clone()
        .or_else(default_credentials_file)?;
    let contents = std::fs::read_to_string(&path)
        .inspect_err(|err| tracing::debug!("credentials file {} unreadable: {err}", path.display()))
        .ok()?;
    let credentials: CredentialsFile = serde_json::from_str(&contents)
        .inspect_err(|err| tracing::warn!("credentials file {} unparsable: {err}", path.display()))
        .ok()?;
    Some(credentials.oauth?.access_token)
}

fn default_credentials_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join(".credentials.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::header;
    use wiremock::matchers::method;
    use wiremock::matchers::path;

    fn account(label: &str, base_url: &str, file: &std::path::Path) -> AccountConfig {
        AccountConfig {
            label: label.to_string(),
            is_api: false,
            api_key_env: None,
            credentials_file: Some(file.to_path_buf()),
            base_url: Some(base_url.to_string()),
        }
    }

    fn write_credentials(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"claudeAiOauth": {"accessToken": "sk-test-token"}}"#,
        )
        .expect("write credentials");
        path
    }

    #[tokio::test]
    async fn maps_usage_windows() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let creds = write_credentials(&dir);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(USAGE_PATH))
            .and(header("authorization", "Bearer sk-test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "five_hour": {"utilization": 45.0, "resets_at": "2026-08-01T12:00:00Z"},
                "seven_day": {"utilization": 12.0, "resets_at": null},
                "extra_usage": {"used_usd": 3.5, "cap_usd": 50.0},
                "future_field": "ignored"
            })))
            .mount(&server)
            .await;

        let collector = ClaudeCollector::new(
            vec![account("personal", &server.uri(), &creds)],
            Duration::from_secs(300),
        );
        let payload = collector
            .collect(CancellationToken::new())
            .await
            .expect("collect");
        let Payload::Quota(quota) = payload else {
            panic!("expected quota payload");
        };
        assert_eq!(quota.accounts.len(), 1);
        let account = &quota.accounts[0];
        assert_eq!(account.status, AccountStatus::Ok);
        assert_eq!(
            account.five_hour.as_ref().map(|w| w.used_percent),
            Some(45.0)
        );
        assert_eq!(
            account.extra_usage.as_ref().map(|e| e.cap_usd),
            Some(50.0)
        );
    }

    #[tokio::test]
    async fn unauthorized_marks_account_auth_failed() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let creds = write_credentials(&dir);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let collector = ClaudeCollector::new(
            vec![account("personal", &server.uri(), &creds)],
            Duration::from_secs(300),
        );
        let Payload::Quota(quota) = collector
            .collect(CancellationToken::new())
            .await
            .expect("collect")
        else {
            panic!("expected quota payload");
        };
        assert_eq!(quota.accounts[0].status, AccountStatus::AuthFailed);
    }

    #[tokio::test]
    async fn rate_limited_and_server_error_statuses() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let creds = write_credentials(&dir);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let collector = ClaudeCollector::new(
            vec![account("personal", &server.uri(), &creds)],
            Duration::from_secs(300),
        );
        let Payload::Quota(quota) = collector
            .collect(CancellationToken::new())
            .await
            .expect("collect")
        else {
            panic!("expected quota payload");
        };
        assert_eq!(quota.accounts[0].status, AccountStatus::RateLimited);
    }

    #[tokio::test]
    async fn missing_credentials_is_auth_failed_without_network() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let missing = dir.path().join("nope.json");
        let collector = ClaudeCollector::new(
            vec![account("personal", "http://127.0.0.1:1", &missing)],
            Duration::from_secs(300),
        );
        let Payload::Quota(quota) = collector
            .collect(CancellationToken::new())
            .await
            .expect("collect")
        else {
            panic!("expected quota payload");
        };
        assert_eq!(quota.accounts[0].status, AccountStatus::AuthFailed);
    }
}
