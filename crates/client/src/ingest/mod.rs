//! Per-user ingestion of starred repositories and their READMEs.
//!
//! One tokio task per user walks the pipeline:
//!
//! 1. exchange the OAuth code for a token
//! 2. look up the login name
//! 3. page through the starred listing (capped, de-duplicated)
//! 4. reuse cached repositories and fetch READMEs for the new ones only
//! 5. publish the repository list and mark the user fetched
//!
//! Failures never escape the task. A failing step degrades to an empty or
//! partial result and the user still ends up in [`ReposState::Fetched`].
//!
//! Outbound calls are bounded by two process-wide pools: a small one for
//! token, user and listing calls and a large one for README downloads.

use crate::github::{GitHubError, StarredRecord, StarsApi, parse_starred};
use crate::markdown::normalize;
use chrono::Utc;
use starsearch_core::{AppConfig, RepoCache, ReposState, Repository, User};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};

/// Username recorded when the login lookup fails.
pub const UNKNOWN_USERNAME: &str = "unknown";

/// Pipeline limits.
#[derive(Debug, Clone, Copy)]
pub struct IngestConfig {
    /// Starred items requested per page.
    pub per_page: usize,
    /// Hard cap on repositories kept per user.
    pub max_repo_count: usize,
    /// Concurrent token, user and listing calls.
    pub light_concurrency: usize,
    /// Concurrent README fetches.
    pub readme_concurrency: usize,
}

impl From<&AppConfig> for IngestConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            per_page: config.per_page,
            max_repo_count: config.max_repo_count,
            light_concurrency: config.light_concurrency,
            readme_concurrency: config.readme_concurrency,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runs ingestion tasks against a shared cache.
#[derive(Clone)]
pub struct Ingestor {
    api: Arc<dyn StarsApi>,
    cache: Arc<RepoCache>,
    light: Arc<Semaphore>,
    heavy: Arc<Semaphore>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(api: Arc<dyn StarsApi>, cache: Arc<RepoCache>, config: IngestConfig) -> Self {
        Self {
            api,
            cache,
            light: Arc::new(Semaphore::new(config.light_concurrency)),
            heavy: Arc::new(Semaphore::new(config.readme_concurrency)),
            config,
        }
    }

    pub fn cache(&self) -> &Arc<RepoCache> {
        &self.cache
    }

    /// Start ingestion for `user` in the background.
    pub fn spawn(&self, user: Arc<User>, code: String) -> JoinHandle<()> {
        let ingestor = self.clone();
        tokio::spawn(async move { ingestor.run(user, code).await })
    }

    /// Run the whole pipeline for `user` to completion.
    pub async fn run(&self, user: Arc<User>, code: String) {
        let token = match self.light_call(self.api.exchange_code(&code)).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token exchange failed");
                user.set_repos(Vec::new()).await;
                user.advance(ReposState::Fetched).await;
                return;
            }
        };
        user.set_token(token.as_str()).await;

        let username = match self.light_call(self.api.current_user(&token)).await {
            Ok(login) => login,
            Err(e) => {
                tracing::warn!(error = %e, "user lookup failed");
                UNKNOWN_USERNAME.to_string()
            }
        };
        user.set_username(username.as_str()).await;

        user.advance(ReposState::Fetching).await;

        let records = self.list_starred(&token, &username).await;

        let now = Utc::now();
        let mut cached = Vec::new();
        let mut fresh = Vec::new();
        for record in records.iter() {
            match self.cache.lookup(record.id).await {
                Some(repo) => {
                    repo.touch(now);
                    cached.push(repo);
                }
                None => fresh.push(Arc::new(new_repository(record, now))),
            }
        }
        user.set_progress(cached.len(), records.len()).await;

        tracing::info!(user = %username, cached = cached.len(), new = fresh.len(), "fetching readmes");

        self.fetch_readmes(&user, &token, &fresh).await;

        let now = Utc::now();
        for repo in &fresh {
            self.cache.insert(repo.clone(), now).await;
        }

        let mut repos = cached;
        repos.extend(fresh);
        user.set_repos(repos).await;
        user.advance(ReposState::Fetched).await;

        tracing::info!(user = %username, repos = records.len(), "ingestion finished");
    }

    async fn light_call<T>(&self, call: impl Future<Output = Result<T, GitHubError>>) -> Result<T, GitHubError> {
        let _permit = self.light.acquire().await.map_err(|_| GitHubError::PoolClosed)?;
        call.await
    }

    /// Page through the starred listing.
    ///
    /// Stops on a short page, on reaching the cap, or on the first failed
    /// request. The result never exceeds `max_repo_count`.
    async fn list_starred(&self, token: &str, username: &str) -> Vec<StarredRecord> {
        let per_page = self.config.per_page;
        let max = self.config.max_repo_count;

        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut listed = 0;
        let mut page = 1;

        loop {
            let items = match self.light_call(self.api.starred_page(token, page, per_page)).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(user = %username, page, error = %e, "starred listing stopped early");
                    break;
                }
            };

            let raw = items.len();
            listed += raw;
            records.extend(parse_starred(items).into_iter().filter(|record| seen.insert(record.id)));

            if raw < per_page || listed >= max || records.len() >= max {
                break;
            }
            page += 1;
        }

        records.truncate(max);
        records
    }

    /// Fetch and normalize READMEs for `repos`, waiting for all of them.
    async fn fetch_readmes(&self, user: &Arc<User>, token: &str, repos: &[Arc<Repository>]) {
        let mut join_set = JoinSet::new();

        for repo in repos {
            let Ok(permit) = self.heavy.clone().acquire_owned().await else {
                tracing::warn!("readme pool closed");
                break;
            };
            let api = self.api.clone();
            let user = user.clone();
            let token = token.to_string();
            let repo = repo.clone();

            join_set.spawn(async move {
                let _permit = permit;
                match api.readme(&token, &repo.owner_name, &repo.name).await {
                    Ok(markdown) => {
                        repo.set_readme(normalize(&markdown));
                    }
                    Err(e) => {
                        tracing::debug!(repo_id = repo.id, repo = %repo.name, error = %e, "readme fetch failed");
                    }
                }
                user.increment_fetched().await;
            });
        }

        while let Some(result) = join_set.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "readme task failed");
            }
        }
    }
}

fn new_repository(record: &StarredRecord, now: chrono::DateTime<Utc>) -> Repository {
    Repository::new(
        record.id,
        record.name.as_str(),
        record.owner_id,
        record.owner_name.as_str(),
        record.forks,
        record.stars,
        record.starred_at,
        now,
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::github::{GitHubError, StarsApi};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    pub(crate) fn starred(id: u64, name: &str, owner: &str) -> Value {
        json!({
            "starred_at": "2024-02-01T00:00:00Z",
            "repo": {
                "id": id,
                "name": name,
                "forks_count": 1,
                "stargazers_count": 10,
                "owner": { "id": id * 10, "login": owner }
            }
        })
    }

    /// In-process [`StarsApi`] that counts calls.
    pub(crate) struct FakeApi {
        pub token: Option<String>,
        pub login: Option<String>,
        pub starred: Vec<Value>,
        /// Serve full pages of fresh ids forever.
        pub endless: bool,
        pub fail_page: Option<usize>,
        pub readmes: HashMap<String, String>,
        /// When set, each README fetch waits for one permit.
        pub readme_gate: Option<Arc<Semaphore>>,
        pub page_calls: AtomicUsize,
        pub readme_calls: Mutex<Vec<String>>,
    }

    impl Default for FakeApi {
        fn default() -> Self {
            Self {
                token: Some("gho_test".into()),
                login: Some("octocat".into()),
                starred: Vec::new(),
                endless: false,
                fail_page: None,
                readmes: HashMap::new(),
                readme_gate: None,
                page_calls: AtomicUsize::new(0),
                readme_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl FakeApi {
        pub(crate) fn with_repos(repos: &[(u64, &str, &str)]) -> Self {
            Self {
                starred: repos.iter().map(|(id, name, owner)| starred(*id, name, owner)).collect(),
                readmes: repos
                    .iter()
                    .map(|(_, name, _)| (name.to_string(), format!("# {name}\n\nAbout **{name}**.")))
                    .collect(),
                ..Default::default()
            }
        }

        pub(crate) fn page_calls(&self) -> usize {
            self.page_calls.load(Ordering::SeqCst)
        }

        pub(crate) fn readme_calls(&self) -> Vec<String> {
            self.readme_calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl StarsApi for FakeApi {
        async fn exchange_code(&self, _code: &str) -> Result<String, GitHubError> {
            self.token.clone().ok_or_else(|| GitHubError::OAuth("bad_verification_code".into()))
        }

        async fn current_user(&self, _token: &str) -> Result<String, GitHubError> {
            self.login.clone().ok_or(GitHubError::AuthError)
        }

        async fn starred_page(&self, _token: &str, page: usize, per_page: usize) -> Result<Vec<Value>, GitHubError> {
            self.page_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_page == Some(page) {
                return Err(GitHubError::HttpError { status: 502 });
            }
            if self.endless {
                let first = ((page - 1) * per_page) as u64;
                return Ok((first..first + per_page as u64).map(|id| starred(id, &format!("repo{id}"), "o")).collect());
            }
            Ok(self.starred.iter().skip((page - 1) * per_page).take(per_page).cloned().collect())
        }

        async fn readme(&self, _token: &str, _owner: &str, name: &str) -> Result<String, GitHubError> {
            self.readme_calls.lock().unwrap().push(name.to_string());
            if let Some(gate) = &self.readme_gate {
                gate.acquire().await.unwrap().forget();
            }
            self.readmes.get(name).cloned().ok_or(GitHubError::HttpError { status: 404 })
        }
    }
}
