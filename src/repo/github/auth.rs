use std::process::Command;

use anyhow::{Result, anyhow};

fn token_from_env(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(anyhow!(
                    "{name} is set but blank; export a token or unset it to fall back to `gh auth token`"
                ));
            }
            Ok(Some(trimmed))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow!("{name} is not usable as a token: {e}")),
    }
}

/// Ask the GitHub CLI for its stored token, honouring `GH_HOST` for Enterprise.
fn token_from_gh_cli() -> Result<String> {
    let mut cmd = Command::new("gh");
    cmd.args(["auth", "token"]);
    if let Some(host) = std::env::var("GH_HOST").ok().filter(|h| !h.trim().is_empty()) {
        cmd.args(["--hostname", host.trim()]);
    }

    let output = cmd
        .output()
        .map_err(|e| anyhow!("GitHub CLI not available ({e})"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("GitHub CLI has no token: {}", stderr.trim()));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(anyhow!("GitHub CLI printed an empty token"));
    }
    Ok(token)
}

/// Pick the API token, falling back through the usual places.
///
/// Priority:
/// 1) `explicit` (`--token` / `API_TOKEN`)
/// 2) `GITHUB_TOKEN`
/// 3) `gh auth token` (optionally with `GH_HOST`)
pub fn resolve_token(explicit: Option<&str>) -> Result<String> {
    if let Some(raw) = explicit {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("API_TOKEN / --token is set but blank"));
        }
        return Ok(trimmed.to_string());
    }
    if let Some(token) = token_from_env("GITHUB_TOKEN")? {
        return Ok(token);
    }
    token_from_gh_cli()
        .map_err(|e| anyhow!("no API token (set API_TOKEN or GITHUB_TOKEN): {e}"))
}
