pub mod job_table;

use crate::config::Config;
use crate::environment::Environment;
use crate::parser::parse_line;
use crate::process::ProcessState;
use crate::process::signal::ignore_job_control_signals;
use anyhow::Result;
use job_table::JobTable;
use libc::{STDIN_FILENO, c_int};
use nix::unistd::{Pid, getpid, setpgid, tcsetpgrp};
use psh_types::Context;
use tracing::{debug, warn};

pub const APP_NAME: &str = "psh";
pub const SHELL_TERMINAL: c_int = STDIN_FILENO;

/// Interpreter state: configuration, builtin-visible environment and the
/// background job table.
pub struct Shell {
    pub config: Config,
    pub pid: Pid,
    pub pgid: Pid,
    pub env: Environment,
    pub jobs: JobTable,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("pid", &self.pid)
            .field("pgid", &self.pgid)
            .field("jobs", &self.jobs.len())
            .finish()
    }
}

impl Shell {
    pub fn new(config: Config) -> Self {
        let pid = getpid();
        let env = Environment::new(config.history_size);
        let jobs = JobTable::new(config.max_jobs);
        Shell {
            config,
            pid,
            pgid: pid,
            env,
            jobs,
        }
    }

    pub fn context(&self, interactive: bool) -> Context {
        Context::new(self.pid, self.pgid, interactive)
    }

    /// Interactive start-up: ignore job-control signals, lead our own process
    /// group and take the terminal.
    pub fn set_signals(&mut self) {
        if let Err(e) = ignore_job_control_signals() {
            warn!("failed to ignore job control signals: {}", e);
        }
        if let Err(e) = setpgid(self.pid, self.pid) {
            // a session leader cannot move; it already leads its group
            debug!("setpgid {}: {}", self.pid, e);
        }
        self.pgid = self.pid;
        if let Err(e) = tcsetpgrp(SHELL_TERMINAL, self.pgid) {
            warn!("failed to take the terminal: {}", e);
        }
        debug!("signal handlers setup completed");
    }

    /// Replays, records, parses and runs one line. `None` means the line held
    /// no command.
    pub fn eval_str(&mut self, ctx: &Context, input: &str) -> Result<Option<ProcessState>> {
        let line = self.env.history.substitute_replay(input);
        self.env.history.record(&line);

        let Some(mut job) = parse_line(&line)? else {
            return Ok(None);
        };
        let state = job.launch(ctx, &mut self.jobs, &mut self.env)?;
        debug!("eval '{}' -> {}", line, state);
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn init() {
        let _ = tracing_subscriber::fmt::try_init();
    }

    fn shell() -> Shell {
        Shell::new(Config::default())
    }

    #[test]
    fn replayed_line_is_recorded_and_run() {
        init();
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let mut shell = shell();
        let ctx = shell.context(false);

        shell.eval_str(&ctx, "echo -n hi").unwrap();
        let line = format!("replay 1 there > {}", out.display());
        let state = shell.eval_str(&ctx, &line).unwrap();

        assert_eq!(state, Some(ProcessState::Done(0)));
        assert_eq!(fs::read_to_string(&out).unwrap(), "hi there");
        assert_eq!(
            shell.env.history.entries(),
            vec!["echo -n hi".to_string(), format!("echo -n hi there > {}", out.display())]
        );
    }

    #[test]
    fn blank_line_runs_nothing() {
        init();
        let mut shell = shell();
        let ctx = shell.context(false);
        assert_eq!(shell.eval_str(&ctx, "   ").unwrap(), None);
        assert!(shell.env.history.is_empty());
    }

    #[test]
    fn parse_error_is_still_recorded() {
        init();
        let mut shell = shell();
        let ctx = shell.context(false);
        assert!(shell.eval_str(&ctx, "cat <").is_err());
        assert_eq!(shell.env.history.entries(), vec!["cat <"]);
    }

    #[test]
    fn table_size_follows_config() {
        let shell = Shell::new(Config {
            max_jobs: 3,
            ..Config::default()
        });
        assert_eq!(shell.jobs.capacity(), 3);
    }
}
