use nix::unistd::Pid;
use psh_builtin::BuiltinKind;
use tracing::debug;

use super::state::ProcessState;

/// What runs a stage: an external program or an in-process builtin.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CommandKind {
    External,
    Builtin(BuiltinKind),
}

impl CommandKind {
    /// Kind named by `argv[0]`; an empty argument list is external.
    pub fn detect(argv: &[String]) -> Self {
        match argv.first().and_then(|name| psh_builtin::lookup(name)) {
            Some(kind) => CommandKind::Builtin(kind),
            None => CommandKind::External,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, CommandKind::External)
    }
}

/// One stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub(crate) cmd: String,
    pub(crate) argv: Vec<String>,
    pub(crate) infile: Option<String>,
    pub(crate) outfile: Option<String>,
    pub(crate) kind: CommandKind,
    pub(crate) pid: Option<Pid>,
    pub(crate) state: ProcessState,
}

impl Process {
    pub fn new(
        cmd: String,
        argv: Vec<String>,
        infile: Option<String>,
        outfile: Option<String>,
    ) -> Self {
        let kind = CommandKind::detect(&argv);
        debug!("process cmd:{:?} argv:{:?} kind:{:?}", cmd, argv, kind);
        Process {
            cmd,
            argv,
            infile,
            outfile,
            kind,
            pid: None,
            state: ProcessState::Running,
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn infile(&self) -> Option<&str> {
        self.infile.as_deref()
    }

    pub fn outfile(&self) -> Option<&str> {
        self.outfile.as_deref()
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }
}
