use crate::config::Config;
use crate::errors::display_user_error;
use crate::shell::Shell;
use anyhow::{Context as _, Result};
use clap::Parser;
use nix::unistd::isatty;
use psh_types::Context;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod environment;
pub mod errors;
pub mod history;
pub mod parser;
pub mod process;
pub mod prompt;
pub mod shell;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run one line and exit
    #[arg(short, long)]
    pub command: Option<String>,

    /// Number of background job slots
    #[arg(long)]
    pub max_jobs: Option<usize>,

    /// Number of lines kept for `record` and `replay`
    #[arg(long)]
    pub history_size: Option<usize>,

    /// Write debug logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Read settings from this file instead of the xdg config
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Config file values with command-line flags on top.
    pub fn config(&self) -> Config {
        let mut config = Config::load(self.config.as_deref());
        if let Some(max_jobs) = self.max_jobs {
            config.max_jobs = max_jobs;
        }
        if let Some(history_size) = self.history_size {
            config.history_size = history_size;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
        config
    }
}

pub fn lib_main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();

    if let Some(log_file) = config.log_file.as_deref() {
        if let Err(err) = init_tracing(log_file) {
            eprintln!("Failed to initialize tracing: {err:#}");
            return ExitCode::FAILURE;
        }
    }

    let mut shell = Shell::new(config);
    match cli.command.as_deref() {
        Some(command) => execute_command(&mut shell, command),
        None => run_shell(&mut shell),
    }
}

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = std::fs::File::create(log_file)
        .with_context(|| format!("failed to create {}", log_file.display()))?;
    let filter = EnvFilter::try_from_env("PSH_LOG").unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::sync::Arc::new(file))
        .init();
    Ok(())
}

/// `-c` mode: one line, failure status when it reported an error.
pub fn execute_command(shell: &mut Shell, command: &str) -> ExitCode {
    let ctx = shell.context(false);
    match shell.eval_str(&ctx, command) {
        Ok(state) => {
            debug!("run command mode {:?} : {:?}", command, state);
            ExitCode::SUCCESS
        }
        Err(err) => {
            display_user_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Reads lines from stdin until EOF, prompting only when stdin is a terminal.
pub fn run_shell(shell: &mut Shell) -> ExitCode {
    let interactive = isatty(libc::STDIN_FILENO).unwrap_or(false);
    if interactive {
        debug!("running in interactive mode");
        shell.set_signals();
    } else {
        debug!("running in pipe mode");
    }
    let ctx = shell.context(interactive);

    match read_eval_loop(shell, &ctx, io::stdin().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            display_user_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn read_eval_loop<R: BufRead>(shell: &mut Shell, ctx: &Context, mut input: R) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        if ctx.interactive {
            prompt::print_prompt(&mut io::stdout(), shell.config.prompt.as_deref(), &shell.env);
        }
        buf.clear();
        if input.read_until(b'\n', &mut buf).context("failed to read input")? == 0 {
            if ctx.interactive {
                println!();
            }
            return Ok(());
        }

        // invalid UTF-8 must not end the loop
        let line = String::from_utf8_lossy(&buf);
        let command = line.trim_end_matches(['\n', '\r']);
        if command.trim().is_empty() {
            continue;
        }
        debug!("processing input: {}", command);
        if let Err(err) = shell.eval_str(ctx, command) {
            display_user_error(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn flags_override_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_jobs = 5\nhistory_size = 8\n").unwrap();

        let cli = Cli::parse_from([
            "psh",
            "--config",
            path.to_str().unwrap(),
            "--history-size",
            "2",
        ]);
        let config = cli.config();
        assert_eq!(config.max_jobs, 5);
        assert_eq!(config.history_size, 2);
    }

    #[test]
    fn loop_keeps_going_after_errors() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let script = format!(
            "cat < {}\n\n   \necho -n done > {}\n",
            dir.path().join("missing").display(),
            out.display()
        );
        let mut shell = Shell::new(Config::default());
        let ctx = shell.context(false);

        read_eval_loop(&mut shell, &ctx, script.as_bytes()).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "done");
        assert_eq!(shell.env.history.len(), 2);
    }

    #[test]
    fn invalid_utf8_line_does_not_stop_the_loop() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let mut script = b"echo \xff\n".to_vec();
        script.extend_from_slice(format!("echo -n still here > {}\n", out.display()).as_bytes());
        let mut shell = Shell::new(Config::default());
        let ctx = shell.context(false);

        read_eval_loop(&mut shell, &ctx, script.as_slice()).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "still here");
        assert_eq!(shell.env.history.get(1), Some("echo \u{fffd}"));
    }
}
