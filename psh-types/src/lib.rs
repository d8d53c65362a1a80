use anyhow::Result;
use libc::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::Pid;
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::mem;
use std::os::unix::io::FromRawFd;
use std::os::unix::io::RawFd;
use thiserror::Error;

/// psh specific error types
#[derive(Error, Debug)]
pub enum PshError {
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        source: std::io::Error,
    },

    #[error("pipe: {0}")]
    Pipe(nix::Error),

    #[error("fork: {0}")]
    Fork(nix::Error),

    #[error("{cmd}: argument contains a nul byte")]
    NulArgument { cmd: String },

    #[error("empty command")]
    EmptyCommand,

    #[error("syntax error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type PshResult<T> = std::result::Result<T, PshError>;

/// Stream endpoints and shell identity handed to every stage.
///
/// `infile`/`outfile` are borrowed descriptors: a `Context` never closes them.
#[derive(Clone)]
pub struct Context {
    pub shell_pid: Pid,
    pub shell_pgid: Pid,
    pub foreground: bool,
    pub interactive: bool,
    pub infile: RawFd,
    pub outfile: RawFd,
    pub errfile: RawFd,
}

impl Context {
    pub fn new(shell_pid: Pid, shell_pgid: Pid, interactive: bool) -> Self {
        Context {
            shell_pid,
            shell_pgid,
            foreground: true,
            interactive,
            infile: STDIN_FILENO,
            outfile: STDOUT_FILENO,
            errfile: STDERR_FILENO,
        }
    }

    /// Copy of this context with the stage's resolved endpoints.
    pub fn with_io(&self, infile: RawFd, outfile: RawFd) -> Self {
        Context {
            infile,
            outfile,
            ..self.clone()
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        f.debug_struct("Context")
            .field("shell_pid", &self.shell_pid)
            .field("shell_pgid", &self.shell_pgid)
            .field("foreground", &self.foreground)
            .field("interactive", &self.interactive)
            .field("infile", &self.infile)
            .field("outfile", &self.outfile)
            .field("errfile", &self.errfile)
            .finish()
    }
}

impl Context {
    /// Write `msg` to the output endpoint without a trailing newline.
    pub fn write_out(&self, msg: &str) -> Result<()> {
        write_fd(self.outfile, msg.as_bytes())
    }

    pub fn write_stdout(&self, msg: &str) -> Result<()> {
        write_fd(self.outfile, format!("{msg}\n").as_bytes())
    }

    pub fn write_stderr(&self, msg: &str) -> Result<()> {
        write_fd(self.errfile, format!("{msg}\n").as_bytes())
    }
}

fn write_fd(fd: RawFd, buf: &[u8]) -> Result<()> {
    let mut file = unsafe { File::from_raw_fd(fd) };
    let res = file.write_all(buf).and_then(|_| file.flush());
    // the descriptor belongs to the caller
    mem::forget(file);
    res?;
    Ok(())
}

/// Outcome of a builtin handler.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitStatus {
    /// Handled; the pipeline continues.
    Handled,
    /// Handled with an error that was already written to the error stream.
    Failed,
}

impl ExitStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, ExitStatus::Failed)
    }

    /// Integer form of the outcome: positive on success, negative on error.
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Handled => 1,
            ExitStatus::Failed => -1,
        }
    }
}
