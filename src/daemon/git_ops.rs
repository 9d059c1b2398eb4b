use super::errors::{DaemonError, Result};
use super::repo_config::{Registry, RepoCfg};
use git2::Repository;
use log::{debug, info, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum RepoStatus {
    Ready,
    NotARepository(String),
    MissingOrigin,
    OriginMismatch { found: String },
}

/// Opens the checkout and compares its `origin` with the configured URL.
pub fn inspect(repo: &RepoCfg) -> RepoStatus {
    let directory = repo.directory();
    debug!("Inspecting {} for {}", directory.display(), repo.url);

    let repository = match Repository::open(&directory) {
        Ok(repository) => repository,
        Err(error) => return RepoStatus::NotARepository(error.message().to_string()),
    };

    let Ok(remote) = repository.find_remote("origin") else {
        return RepoStatus::MissingOrigin;
    };
    let found = remote.url().unwrap_or_default();

    if same_remote(found, &repo.url) {
        RepoStatus::Ready
    } else {
        RepoStatus::OriginMismatch { found: found.to_string() }
    }
}

fn same_remote(left: &str, right: &str) -> bool {
    fn normalize(url: &str) -> &str {
        let url = url.trim_end_matches('/');
        url.strip_suffix(".git").unwrap_or(url)
    }
    normalize(left) == normalize(right)
}

/// Logs a warning for every repository that is not ready and returns how many there were.
pub fn check_repositories(registry: &Registry) -> usize {
    let mut failed = 0;
    for repo in registry.iter() {
        let directory = repo.directory();
        match inspect(repo) {
            RepoStatus::Ready => info!("{} is ready in {}", repo.url, directory.display()),
            RepoStatus::NotARepository(reason) => {
                failed += 1;
                warn!("{}: {} is not a git repository - {reason}", repo.url, directory.display());
            }
            RepoStatus::MissingOrigin => {
                failed += 1;
                warn!("{}: {} has no 'origin' remote", repo.url, directory.display());
            }
            RepoStatus::OriginMismatch { found } => {
                failed += 1;
                warn!("{}: 'origin' of {} points to {found}", repo.url, directory.display());
            }
        }
    }
    failed
}

/// `--check`: fails if any configured repository is not ready.
pub fn verify_repositories(registry: &Registry) -> Result<()> {
    let failed = check_repositories(registry);
    if failed > 0 {
        return Err(DaemonError::CheckFailed { failed, total: registry.len() });
    }
    info!("All {} repositories look good", registry.len());
    Ok(())
}
