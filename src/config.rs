use anyhow::{Result, anyhow, bail};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub api_base: String,
}

impl GithubConfig {
    pub fn new(
        owner: Option<&str>,
        repo: Option<&str>,
        token: String,
        api_base: Option<&str>,
    ) -> Result<Self> {
        let owner = required_name("owner", "REPO_OWNER", owner)?;
        let repo = required_name("repo", "REPO_NAME", repo)?;
        if token.trim().is_empty() {
            bail!("API token is empty");
        }
        let api_base = match api_base.map(str::trim) {
            Some(base) if !base.is_empty() => base.trim_end_matches('/').to_string(),
            _ => DEFAULT_API_BASE.to_string(),
        };
        if !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
            bail!("GITHUB_API_URL must be an http(s) URL, got {api_base:?}");
        }
        Ok(Self {
            owner,
            repo,
            token: token.trim().to_string(),
            api_base,
        })
    }

    /// `owner/repo`, for headers and log lines.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn required_name(what: &str, env: &str, value: Option<&str>) -> Result<String> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("repository {what} is required (--{what} or env {env})"))?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        bail!("repository {what} {value:?} contains characters GitHub does not allow");
    }
    Ok(value.to_string())
}
