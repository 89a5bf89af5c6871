//! Deploy the production build to a git remote.
//!
//! Two strategies, mirroring common gh-pages setups:
//! - `init`: a throwaway repo inside the dist folder, force-pushed to
//!   the remote. Works when the publish target is a different repo.
//! - `subtree`: `git subtree push` from the project repo. Works for
//!   same-repo gh-pages branches.

use std::path::Path;

use anyhow::{Result, bail};
use chrono::Utc;

use crate::config::{BuildMode, DeployOverrides, DeploymentConfig, DeployStrategy, GlobalConfig, Paths};
use crate::log;
use crate::utils::exec::Cmd;

pub fn run(root: &Path, overrides: &DeployOverrides) -> Result<()> {
    let paths = Paths::new(root, BuildMode::Secure);
    let global = GlobalConfig::load(&paths.global_config());
    let config = global.deployment.with_overrides(overrides);

    log!("deploy"; "starting deployment");
    log!("deploy"; "target: {}/{}", config.remote, config.branch);
    log!("deploy"; "folder: {}", config.dist_folder);
    log!("deploy"; "strategy: {:?}", config.strategy);

    log!("deploy"; "building production...");
    super::build::run(root, BuildMode::Secure, false)?;

    let deploy_dir = root.join(&config.dist_folder);
    if !deploy_dir.is_dir() {
        bail!("build folder \"{}\" not found", config.dist_folder);
    }

    match config.strategy {
        DeployStrategy::Init => deploy_init(root, &deploy_dir, &config)?,
        DeployStrategy::Subtree => deploy_subtree(root, &config)?,
    }

    log!("deploy"; "deployed successfully");
    Ok(())
}

/// Fresh repo inside the dist folder, force-pushed to the remote.
fn deploy_init(root: &Path, deploy_dir: &Path, config: &DeploymentConfig) -> Result<()> {
    log!("deploy"; "deploying via git init strategy...");

    Cmd::new("git").arg("init").cwd(deploy_dir).run()?;
    Cmd::new("git")
        .args(["checkout", "-b", "main"])
        .cwd(deploy_dir)
        .run_allow_failure();
    Cmd::new("git").args(["add", "."]).cwd(deploy_dir).run()?;

    let message = format!("Deploy: {}", Utc::now().to_rfc3339());
    if !Cmd::new("git")
        .args(["commit", "-m", &message])
        .cwd(deploy_dir)
        .run_allow_failure()
    {
        log!("deploy"; "nothing to commit, proceeding to push");
    }

    let remote_url = resolve_remote_url(root, &config.remote)?;
    if !Cmd::new("git")
        .args(["remote", "add", "deploy-remote", &remote_url])
        .cwd(deploy_dir)
        .run_allow_failure()
    {
        Cmd::new("git")
            .args(["remote", "set-url", "deploy-remote", &remote_url])
            .cwd(deploy_dir)
            .run()?;
    }

    let refspec = format!("HEAD:{}", config.branch);
    Cmd::new("git")
        .args(["push", "--force", "deploy-remote", &refspec])
        .cwd(deploy_dir)
        .run()
}

/// `git subtree push` from the project repo.
fn deploy_subtree(root: &Path, config: &DeploymentConfig) -> Result<()> {
    log!("deploy"; "pushing subtree...");

    // Subtree needs the dist folder committed first
    Cmd::new("git")
        .args(["add", &config.dist_folder, "-f"])
        .cwd(root)
        .run_allow_failure();
    Cmd::new("git")
        .args(["commit", "-m", "Deploy: update dist"])
        .cwd(root)
        .run_allow_failure();

    Cmd::new("git")
        .args([
            "subtree",
            "push",
            "--prefix",
            &config.dist_folder,
            &config.remote,
            &config.branch,
        ])
        .cwd(root)
        .run()
}

/// A remote may be a name in the project repo or a literal URL.
fn resolve_remote_url(root: &Path, remote: &str) -> Result<String> {
    if remote.contains("://") || remote.starts_with("git@") {
        return Ok(remote.to_string());
    }
    let output = Cmd::new("git")
        .args(["remote", "get-url", remote])
        .cwd(root)
        .output()
        .map_err(|e| anyhow::anyhow!("could not resolve remote \"{remote}\" to a URL: {e}"))?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_remote_urls_pass_through() {
        let root = Path::new(".");
        let https = resolve_remote_url(root, "https://example.com/site.git").unwrap();
        assert_eq!(https, "https://example.com/site.git");
        let ssh = resolve_remote_url(root, "git@example.com:site.git").unwrap();
        assert_eq!(ssh, "git@example.com:site.git");
    }
}
