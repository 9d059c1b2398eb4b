use super::deploy::DeployRunner;
use super::repo_config::RepoCfg;
use log::debug;

/// Hands a validated repository over to the runner. Returns as soon as the
/// deploy is started.
pub fn dispatch(repo: &RepoCfg, runner: &dyn DeployRunner) {
    debug!("Dispatching deploy for {}", repo.url);
    runner.run(repo.directory(), repo.deploy.clone());
}
