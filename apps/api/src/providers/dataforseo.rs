//! DataForSEO client — SERP, backlink summary and instant on-page audits.
//!
//! Every endpoint takes a JSON array of tasks and answers with a `tasks`
//! envelope; task `status_code` 20000 is the only success code.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::{BacklinkSource, PageAuditor, ProviderError, SerpItem, SerpQuery, SerpSource};
use crate::analysis::models::{BacklinkMetrics, OnPageMetrics};

const DATAFORSEO_BASE_URL: &str = "https://api.dataforseo.com/v3";
const SERP_PATH: &str = "/serp/google/organic/live/advanced";
const BACKLINKS_PATH: &str = "/backlinks/summary/live";
const ON_PAGE_PATH: &str = "/on_page/instant_pages";
const TASK_OK: u32 = 20000;
/// United States. The service targets a single market.
pub const LOCATION_CODE: u32 = 2840;
const LANGUAGE_CODE: &str = "en";

#[derive(Debug, Serialize)]
struct SerpTask<'a> {
    keyword: &'a str,
    location_code: u32,
    language_code: &'a str,
    depth: u32,
}

#[derive(Debug, Serialize)]
struct BacklinksTask<'a> {
    target: &'a str,
}

#[derive(Debug, Serialize)]
struct OnPageTask<'a> {
    url: &'a str,
    enable_javascript: bool,
}

#[derive(Debug, Deserialize)]
struct Envelope<R> {
    #[serde(default)]
    status_code: u32,
    #[serde(default)]
    status_message: String,
    /// Null when the whole request was refused (auth, balance, rate limit).
    tasks: Option<Vec<Task<R>>>,
}

impl<R> Envelope<R> {
    fn into_tasks(self) -> Result<Vec<Task<R>>, ProviderError> {
        self.tasks.ok_or_else(|| {
            ProviderError::Upstream(format!(
                "DataForSEO error ({}): {}",
                self.status_code, self.status_message
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct Task<R> {
    status_code: u32,
    #[serde(default)]
    status_message: String,
    result: Option<Vec<R>>,
}

impl<R> Task<R> {
    /// First result of a successful task, or the task's own failure.
    fn into_first_result(self) -> Result<Option<R>, ProviderError> {
        if self.status_code != TASK_OK {
            return Err(ProviderError::Task {
                code: self.status_code,
                message: self.status_message,
            });
        }
        Ok(self.result.and_then(|r| r.into_iter().next()))
    }
}

#[derive(Debug, Deserialize)]
struct SerpResult {
    #[serde(default)]
    items: Option<Vec<RawSerpItem>>,
}

#[derive(Debug, Deserialize)]
struct RawSerpItem {
    #[serde(rename = "type", default)]
    item_type: String,
    rank_absolute: Option<u32>,
    domain: Option<String>,
    url: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BacklinksResult {
    rank: Option<u32>,
    backlinks: Option<u64>,
    referring_domains: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OnPageResult {
    #[serde(default)]
    items: Option<Vec<OnPageItem>>,
}

#[derive(Debug, Deserialize)]
struct OnPageItem {
    onpage_score: Option<f64>,
    status_code: Option<u16>,
    meta: Option<OnPageMeta>,
}

#[derive(Debug, Deserialize)]
struct OnPageMeta {
    title: Option<String>,
}

/// Client for the DataForSEO v3 REST API (basic auth).
#[derive(Clone)]
pub struct DataForSeoClient {
    client: Client,
    login: String,
    password: String,
}

impl DataForSeoClient {
    pub fn new(login: String, password: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            login,
            password,
        })
    }

    async fn post_tasks<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        tasks: &[T],
    ) -> Result<Vec<Task<R>>, ProviderError> {
        if self.login.is_empty() || self.password.is_empty() {
            return Err(ProviderError::NotConfigured("DataForSEO"));
        }

        let response = self
            .client
            .post(format!("{DATAFORSEO_BASE_URL}{path}"))
            .basic_auth(&self.login, Some(&self.password))
            .json(tasks)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: Envelope<R> = response.json().await?;
        envelope.into_tasks()
    }

    async fn single_task<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        task: T,
    ) -> Result<Option<R>, ProviderError> {
        self.post_tasks::<T, R>(path, &[task])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("response contained no tasks".to_string()))?
            .into_first_result()
    }
}

#[async_trait]
impl SerpSource for DataForSeoClient {
    async fn search(&self, query: &SerpQuery) -> Result<Vec<SerpItem>, ProviderError> {
        let task = SerpTask {
            keyword: &query.keyword,
            location_code: LOCATION_CODE,
            language_code: LANGUAGE_CODE,
            depth: query.depth,
        };
        let result: Option<SerpResult> = self.single_task(SERP_PATH, task).await?;

        let items: Vec<SerpItem> = result
            .and_then(|r| r.items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                Some(SerpItem {
                    position: item.rank_absolute?,
                    item_type: item.item_type,
                    domain: item.domain.unwrap_or_default(),
                    url: item.url.unwrap_or_default(),
                    title: item.title.unwrap_or_default(),
                })
            })
            .collect();

        debug!("SERP for '{}': {} items", query.keyword, items.len());
        Ok(items)
    }
}

#[async_trait]
impl BacklinkSource for DataForSeoClient {
    async fn backlink_summary(&self, domain: &str) -> Result<BacklinkMetrics, ProviderError> {
        let result: Option<BacklinksResult> = self
            .single_task(BACKLINKS_PATH, BacklinksTask { target: domain })
            .await?;

        let result = result.ok_or_else(|| {
            ProviderError::Malformed(format!("no backlink summary returned for {domain}"))
        })?;

        Ok(BacklinkMetrics {
            rank: result.rank.unwrap_or(0),
            backlinks: result.backlinks.unwrap_or(0),
            referring_domains: result.referring_domains.unwrap_or(0),
        })
    }
}

#[async_trait]
impl PageAuditor for DataForSeoClient {
    async fn audit_pages(
        &self,
        urls: &[String],
    ) -> Result<Vec<Result<OnPageMetrics, ProviderError>>, ProviderError> {
        let tasks: Vec<OnPageTask<'_>> = urls
            .iter()
            .map(|url| OnPageTask {
                url,
                enable_javascript: true,
            })
            .collect();

        let tasks: Vec<Task<OnPageResult>> = self.post_tasks(ON_PAGE_PATH, &tasks).await?;

        Ok(tasks
            .into_iter()
            .map(|task| {
                let item = task
                    .into_first_result()?
                    .and_then(|r| r.items)
                    .and_then(|items| items.into_iter().next())
                    .ok_or_else(|| ProviderError::Malformed("no page data returned".to_string()))?;
                Ok(OnPageMetrics {
                    score: item.onpage_score.unwrap_or(0.0),
                    title: item.meta.and_then(|m| m.title).unwrap_or_default(),
                    status_code: item.status_code.unwrap_or(0),
                })
            })
            .collect())
    }
}
