use anyhow::Result;
use once_cell::sync::Lazy;
use psh_types::{Context, ExitStatus};
use std::path::PathBuf;
use tracing::debug;

// Builtin command modules
pub mod cd;
mod echo;
mod help;
mod history;
mod mypid;
mod replay;

/// Trait that provides an interface for builtin commands to interact with the shell
/// This allows builtin commands to perform shell operations without direct coupling
pub trait ShellProxy {
    /// Terminates the interpreter process
    fn exit_shell(&mut self);

    /// Changes the current working directory and updates shell state
    fn changepwd(&mut self, path: &str) -> Result<()>;

    /// Home directory used by `cd` without arguments
    fn home_dir(&self) -> Option<PathBuf>;

    /// Processed history lines, oldest first
    fn history(&self) -> Vec<String>;

    /// Maximum number of lines the history keeps
    fn history_capacity(&self) -> usize;
}

/// Type alias for builtin command function signature
/// All builtin commands must conform to this signature
pub type BuiltinCommand =
    fn(ctx: &Context, argv: &[String], proxy: &mut dyn ShellProxy) -> ExitStatus;

/// Identifier of a builtin command
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BuiltinKind {
    Exit = 1,
    Cd,
    Help,
    Echo,
    Record,
    Replay,
    Mypid,
}

impl BuiltinKind {
    /// Stable numeric identifier; 0 is reserved for external commands.
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        entry(self).name
    }
}

pub struct Builtin {
    pub name: &'static str,
    pub kind: BuiltinKind,
    pub command: BuiltinCommand,
}

/// Ordered registry of all builtin commands; lookups scan it front to back
pub static BUILTIN_COMMAND: Lazy<Vec<Builtin>> = Lazy::new(|| {
    vec![
        Builtin {
            name: "exit",
            kind: BuiltinKind::Exit,
            command: exit,
        },
        Builtin {
            name: "cd",
            kind: BuiltinKind::Cd,
            command: cd::command,
        },
        Builtin {
            name: "help",
            kind: BuiltinKind::Help,
            command: help::command,
        },
        Builtin {
            name: "echo",
            kind: BuiltinKind::Echo,
            command: echo::command,
        },
        Builtin {
            name: "record",
            kind: BuiltinKind::Record,
            command: history::command,
        },
        Builtin {
            name: "replay",
            kind: BuiltinKind::Replay,
            command: replay::command,
        },
        Builtin {
            name: "mypid",
            kind: BuiltinKind::Mypid,
            command: mypid::command,
        },
    ]
});

fn entry(kind: BuiltinKind) -> &'static Builtin {
    BUILTIN_COMMAND
        .iter()
        .find(|b| b.kind == kind)
        .unwrap_or_else(|| unreachable!("every BuiltinKind is registered"))
}

/// Resolves a command name to a builtin kind.
/// Returns None for external commands; the match is exact and case-sensitive
pub fn lookup(name: &str) -> Option<BuiltinKind> {
    BUILTIN_COMMAND
        .iter()
        .find(|b| b.name == name)
        .map(|b| b.kind)
}

/// Runs the handler registered for `kind` against already-resolved endpoints in `ctx`
pub fn invoke(
    kind: BuiltinKind,
    ctx: &Context,
    argv: &[String],
    proxy: &mut dyn ShellProxy,
) -> ExitStatus {
    debug!(
        "invoke builtin {} infile:{} outfile:{}",
        kind.name(),
        ctx.infile,
        ctx.outfile
    );
    (entry(kind).command)(ctx, argv, proxy)
}

/// Built-in exit command implementation
/// Terminates the interpreter; other stages are not cleaned up
pub fn exit(_ctx: &Context, _argv: &[String], proxy: &mut dyn ShellProxy) -> ExitStatus {
    debug!("Exit command called");
    proxy.exit_shell();
    ExitStatus::Handled
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ShellProxy;
    use anyhow::{Result, bail};
    use nix::unistd::getpid;
    use psh_types::Context;
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom};
    use std::os::unix::io::AsRawFd;
    use std::path::PathBuf;
    use tempfile::tempfile;

    #[derive(Default)]
    pub struct MockProxy {
        pub exited: bool,
        pub cwd: Option<String>,
        pub home: Option<PathBuf>,
        pub history: Vec<String>,
    }

    impl ShellProxy for MockProxy {
        fn exit_shell(&mut self) {
            self.exited = true;
        }

        fn changepwd(&mut self, path: &str) -> Result<()> {
            if path.starts_with("/nonexistent") {
                bail!("No such file or directory");
            }
            self.cwd = Some(path.to_string());
            Ok(())
        }

        fn home_dir(&self) -> Option<PathBuf> {
            self.home.clone()
        }

        fn history(&self) -> Vec<String> {
            self.history.clone()
        }

        fn history_capacity(&self) -> usize {
            16
        }
    }

    /// Captures what a builtin writes to its output and error endpoints.
    pub struct Capture {
        out: File,
        err: File,
    }

    impl Capture {
        pub fn new() -> Self {
            Capture {
                out: tempfile().unwrap(),
                err: tempfile().unwrap(),
            }
        }

        pub fn context(&self) -> Context {
            let mut ctx = Context::new(getpid(), getpid(), false)
                .with_io(std::io::stdin().as_raw_fd(), self.out.as_raw_fd());
            ctx.errfile = self.err.as_raw_fd();
            ctx
        }

        pub fn stdout(&mut self) -> String {
            read_all(&mut self.out)
        }

        pub fn stderr(&mut self) -> String {
            read_all(&mut self.err)
        }
    }

    fn read_all(file: &mut File) -> String {
        let mut buf = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut buf).unwrap();
        buf
    }

    pub fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }
}
