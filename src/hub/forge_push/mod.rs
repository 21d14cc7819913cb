//! `forge_push`: publish a file map to a forge repository over git.
//!
//! The push runs as ordered stages (see [`PushStage`]) inside a scoped
//! temporary directory. The first failing stage aborts the rest, and the
//! directory is removed when the guard drops on every exit path.
//!
//! The repository is initialized before any caller file is written, and no
//! file may land inside a `.git` directory: a caller-supplied git config
//! could otherwise name filter or fsmonitor commands for git to run.

use crate::errors::{GridError, PushStage};
use crate::hub::tools::PushArgs;
use crate::services::ServiceClient;
use crate::utils::subprocess::git_command;
use crate::utils::truncate_chars;
use std::collections::BTreeMap;
use std::path::{Component, Path};
use tracing::{debug, info};
use url::Url;

const MAX_GIT_OUTPUT_CHARS: usize = 500;
const REDACTED: &str = "***";
const WORKDIR_PREFIX: &str = "gridhub-push-";

/// Author identity and message for the single commit.
#[derive(Debug, Clone)]
pub struct CommitSpec<'a> {
    pub author: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Resolve the caller, then force-push `args.files` as one commit to
/// `{owner}/{repo_name}` on the forge.
pub async fn forge_push(
    services: &ServiceClient,
    token: &str,
    args: &PushArgs,
) -> Result<String, GridError> {
    let owner = resolve_identity(services, token).await?;
    let remote = services
        .forge_remote(token, &owner, &args.repo_name)
        .map_err(|e| stage_error(PushStage::Push, e.to_string()))?;
    let email = format!("{owner}@{}", mail_domain(services));
    let commit = CommitSpec {
        author: &owner,
        email: &email,
        message: &args.commit_message,
    };

    publish(&args.files, &commit, remote.as_str(), token).await?;
    info!(
        "pushed {} file(s) to {}/{}",
        args.files.len(),
        owner,
        args.repo_name
    );
    Ok(format!("Successfully pushed to {}", args.repo_name))
}

/// The caller's username: `sub`, else `preferred_username`.
pub async fn resolve_identity(services: &ServiceClient, token: &str) -> Result<String, GridError> {
    let info = services
        .userinfo(token)
        .await
        .map_err(|e| stage_error(PushStage::ResolveIdentity, e.to_string()))?;
    ["sub", "preferred_username"]
        .iter()
        .find_map(|key| info.get(key).and_then(|v| v.as_str()))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            stage_error(
                PushStage::ResolveIdentity,
                "userinfo carried no subject".to_string(),
            )
        })
}

/// Init, materialize, commit and push in a fresh directory under the
/// system temp dir. `secret` is scrubbed from any git output that ends up
/// in an error.
pub async fn publish(
    files: &BTreeMap<String, String>,
    commit: &CommitSpec<'_>,
    remote: &str,
    secret: &str,
) -> Result<(), GridError> {
    publish_in(&std::env::temp_dir(), files, commit, remote, secret).await
}

/// [`publish`] with the scratch directory created under `parent`.
pub async fn publish_in(
    parent: &Path,
    files: &BTreeMap<String, String>,
    commit: &CommitSpec<'_>,
    remote: &str,
    secret: &str,
) -> Result<(), GridError> {
    let workdir = tempfile::Builder::new()
        .prefix(WORKDIR_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| stage_error(PushStage::Init, e.to_string()))?;
    let dir = workdir.path();

    run_git(dir, PushStage::Init, &["init", "--quiet"], secret).await?;
    materialize(dir, files).await?;

    let steps = [
        (PushStage::Commit, vec!["config", "user.email", commit.email]),
        (PushStage::Commit, vec!["config", "user.name", commit.author]),
        (PushStage::Commit, vec!["add", "-A"]),
        (PushStage::Commit, vec!["commit", "--quiet", "-m", commit.message]),
        (
            PushStage::Push,
            vec!["push", "--force", "--quiet", remote, "HEAD:main"],
        ),
    ];
    for (stage, args) in steps {
        run_git(dir, stage, &args, secret).await?;
    }
    Ok(())
}

/// Write every file below `root`, creating parent directories.
async fn materialize(root: &Path, files: &BTreeMap<String, String>) -> Result<(), GridError> {
    for (name, content) in files {
        let relative = checked_relative(name)?;
        let target = root.join(relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| stage_error(PushStage::Materialize, format!("{name}: {e}")))?;
        }
        tokio::fs::write(&target, content)
            .await
            .map_err(|e| stage_error(PushStage::Materialize, format!("{name}: {e}")))?;
    }
    debug!("materialized {} file(s) in {}", files.len(), root.display());
    Ok(())
}

fn checked_relative(name: &str) -> Result<&Path, GridError> {
    let path = Path::new(name);
    let mut normal = 0;
    for component in path.components() {
        match component {
            Component::Normal(part) if part.eq_ignore_ascii_case(".git") => {
                return Err(stage_error(
                    PushStage::Materialize,
                    format!("refusing path inside a .git directory: {name}"),
                ));
            }
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(stage_error(
                    PushStage::Materialize,
                    format!("refusing path outside the repository: {name}"),
                ));
            }
        }
    }
    if normal == 0 {
        return Err(stage_error(
            PushStage::Materialize,
            format!("empty file path \"{name}\""),
        ));
    }
    Ok(path)
}

async fn run_git(
    dir: &Path,
    stage: PushStage,
    args: &[&str],
    secret: &str,
) -> Result<(), GridError> {
    debug!("git {} ({})", args.first().copied().unwrap_or_default(), stage);
    let output = git_command()
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|e| stage_error(stage, format!("failed to run git: {e}")))?;

    if output.status.success() {
        return Ok(());
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    let detail = redact(detail, secret);
    Err(stage_error(
        stage,
        truncate_chars(&detail, MAX_GIT_OUTPUT_CHARS).to_string(),
    ))
}

fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, REDACTED)
}

fn mail_domain(services: &ServiceClient) -> String {
    Url::parse(&services.endpoints().mail)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "mail.psx".to_string())
}

fn stage_error(stage: PushStage, message: String) -> GridError {
    GridError::Push { stage, message }
}
