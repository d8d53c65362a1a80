use crate::history::History;
use anyhow::{Context as _, Result, anyhow};
use nix::unistd::{User, chdir, getuid};
use psh_builtin::ShellProxy;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shell-wide state the builtins reach through [`ShellProxy`].
#[derive(Debug)]
pub struct Environment {
    pub home_dir: Option<PathBuf>,
    pub user: String,
    pub cwd: PathBuf,
    pub history: History,
}

impl Environment {
    pub fn new(history_size: usize) -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        let env = Environment {
            home_dir: dirs::home_dir(),
            user: current_user(),
            cwd,
            history: History::new(history_size),
        };
        debug!(
            "environment user:{} home:{:?} cwd:{:?}",
            env.user, env.home_dir, env.cwd
        );
        env
    }

    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        Environment::new(16)
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

fn current_user() -> String {
    env::var("USER")
        .or_else(|_| env::var("LOGNAME"))
        .ok()
        .filter(|name| !name.is_empty())
        .or_else(|| {
            User::from_uid(getuid())
                .ok()
                .flatten()
                .map(|user| user.name)
        })
        .unwrap_or_else(|| "unknown".to_string())
}

impl ShellProxy for Environment {
    fn exit_shell(&mut self) {
        debug!("exit requested");
        std::io::stdout().flush().ok();
        std::process::exit(0);
    }

    fn changepwd(&mut self, path: &str) -> Result<()> {
        // the errno text alone is what `cd` shows after the path
        chdir(path).map_err(|e| anyhow!(e.desc()))?;
        self.cwd = env::current_dir().context("failed to read current directory")?;
        debug!("cwd -> {:?}", self.cwd);
        Ok(())
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir.clone()
    }

    fn history(&self) -> Vec<String> {
        self.history.entries()
    }

    fn history_capacity(&self) -> usize {
        self.history.capacity()
    }
}
