//! HTTP client for the GitHub REST API.
//!
//! Fetching is the only place concurrency lives: branch commit lists are
//! requested in parallel and commit details go out in bounded batches.
//! Results are always collected back in branch-list order, so network
//! timing can never change what the pipeline sees.

use crate::graph::types::{BranchCommits, BranchRef, CommitRecord};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{info, warn};

const API_BASE: &str = "https://api.github.com";
const DETAIL_BATCH_SIZE: usize = 50;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Branch list entry as returned by the branches endpoint.
#[derive(Debug, Deserialize)]
struct BranchInfo {
    name: String,
    commit: BranchHead,
}

#[derive(Debug, Deserialize)]
struct BranchHead {
    sha: String,
}

/// Fetch bounds, sourced from settings.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub max_branches: usize,
    pub commits_per_branch: usize,
}

/// Parse a repository reference: a full github.com URL or a bare
/// `owner/repo`. Empty owner or repo is malformed input and nothing is
/// fetched.
pub fn parse_repo_ref(input: &str) -> Result<(String, String), String> {
    let stripped = input
        .trim()
        .trim_start_matches("https://github.com/")
        .trim_start_matches("http://github.com/")
        .trim_end_matches('/')
        .trim_end_matches(".git");

    let mut parts = stripped.split('/');
    let owner = parts.next().unwrap_or("");
    let repo = parts.next().unwrap_or("");
    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(
            "Please enter a valid GitHub repository URL or owner/repo reference.".to_string(),
        );
    }
    Ok((owner.to_string(), repo.to_string()))
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE.to_string(),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        // GitHub rejects requests without a User-Agent.
        let mut request = self
            .client
            .get(url)
            .header("User-Agent", "commit-race")
            .header("Accept", "application/vnd.github+json")
            .timeout(REQUEST_TIMEOUT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }
        request
    }

    /// Fetch the branch list, keeping the first `max` refs. Failure here is
    /// fatal to the whole fetch cycle.
    async fn fetch_branches(
        &self,
        owner: &str,
        repo: &str,
        max: usize,
    ) -> Result<Vec<BranchRef>, String> {
        let url = format!("{}/repos/{}/{}/branches?per_page=100", self.base_url, owner, repo);
        let resp = self
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch branches: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!(
                "Failed to fetch branches: {}. Check the repository name and your API token.",
                resp.status()
            ));
        }
        let branches: Vec<BranchInfo> = resp
            .json()
            .await
            .map_err(|e| format!("Failed to parse branch list: {e}"))?;
        Ok(branches
            .into_iter()
            .take(max)
            .map(|b| BranchRef {
                name: b.name,
                head_sha: b.commit.sha,
            })
            .collect())
    }

    /// Fetch one branch's bounded commit window, newest first.
    async fn fetch_branch_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &BranchRef,
        per_branch: usize,
    ) -> Result<Vec<CommitRecord>, String> {
        let url = format!(
            "{}/repos/{}/{}/commits?sha={}&per_page={}",
            self.base_url,
            owner,
            repo,
            urlencoding::encode(&branch.name),
            per_branch
        );
        let resp = self
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!("API error: {}", resp.status()));
        }
        resp.json()
            .await
            .map_err(|e| format!("Failed to parse commit list: {e}"))
    }

    /// Fetch a single commit's detail resource, which carries change stats.
    async fn fetch_commit_detail(&self, url: &str) -> Result<CommitRecord, String> {
        let resp = self
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!("API error: {}", resp.status()));
        }
        resp.json()
            .await
            .map_err(|e| format!("Failed to parse commit detail: {e}"))
    }

    /// Run a full fetch cycle: branch list, per-branch commit windows, then
    /// detail enrichment. A branch or commit that fails is dropped and the
    /// rest proceeds; only a totally empty outcome is an error.
    pub async fn fetch_race(
        &self,
        owner: &str,
        repo: &str,
        limits: FetchLimits,
    ) -> Result<Vec<BranchCommits>, String> {
        let branches = self
            .fetch_branches(owner, repo, limits.max_branches)
            .await?;
        if branches.is_empty() {
            return Err(format!("No branches found for {owner}/{repo}."));
        }
        info!(count = branches.len(), "fetched branch list");

        // Spawn all branch fetches, then await in branch-list order.
        let mut handles = Vec::new();
        for branch in &branches {
            let client = self.clone();
            let owner = owner.to_string();
            let repo = repo.to_string();
            let branch = branch.clone();
            let per_branch = limits.commits_per_branch;
            handles.push(tokio::spawn(async move {
                let commits = client
                    .fetch_branch_commits(&owner, &repo, &branch, per_branch)
                    .await;
                (branch, commits)
            }));
        }

        let mut branch_data = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((branch, Ok(commits))) => {
                    branch_data.push(BranchCommits { branch, commits });
                }
                Ok((branch, Err(e))) => {
                    warn!(branch = %branch.name, error = %e, "dropping branch after failed commit fetch");
                }
                Err(e) => {
                    warn!(error = %e, "branch fetch task panicked");
                }
            }
        }
        if branch_data.iter().all(|b| b.commits.is_empty()) {
            return Err(format!("No commits could be fetched for {owner}/{repo}."));
        }

        self.enrich_with_details(&mut branch_data).await;
        if branch_data.iter().all(|b| b.commits.is_empty()) {
            return Err(format!("No commit details could be fetched for {owner}/{repo}."));
        }
        Ok(branch_data)
    }

    /// Replace shallow list records with their detail responses, in batches.
    /// A commit whose detail never arrives is removed from every branch
    /// list; the ancestry walk treats the hole as a history horizon.
    async fn enrich_with_details(&self, branch_data: &mut [BranchCommits]) {
        let mut seen = HashSet::new();
        let mut targets: Vec<(String, String)> = Vec::new();
        for branch in branch_data.iter() {
            for commit in &branch.commits {
                if seen.insert(commit.sha.clone()) {
                    targets.push((commit.sha.clone(), commit.url.clone()));
                }
            }
        }

        let mut details: HashMap<String, CommitRecord> = HashMap::new();
        let mut failures = 0usize;
        for batch in targets.chunks(DETAIL_BATCH_SIZE) {
            let mut handles = Vec::new();
            for (sha, url) in batch {
                let client = self.clone();
                let sha = sha.clone();
                let url = url.clone();
                handles.push(tokio::spawn(async move {
                    let detail = client.fetch_commit_detail(&url).await;
                    (sha, detail)
                }));
            }
            for handle in handles {
                match handle.await {
                    Ok((sha, Ok(detail))) => {
                        details.insert(sha, detail);
                    }
                    Ok((sha, Err(e))) => {
                        failures += 1;
                        warn!(%sha, error = %e, "dropping commit after failed detail fetch");
                    }
                    Err(e) => {
                        failures += 1;
                        warn!(error = %e, "detail fetch task panicked");
                    }
                }
            }
        }
        info!(enriched = details.len(), failures, "commit detail fetches settled");

        for branch in branch_data.iter_mut() {
            branch.commits.retain(|c| details.contains_key(&c.sha));
            for commit in branch.commits.iter_mut() {
                if let Some(detail) = details.get(&commit.sha) {
                    *commit = detail.clone();
                }
            }
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
