use anyhow::{Context as _, Result};
use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::{ForkResult, Pid, close, dup2, execvp, fork, getpid, setpgid, tcsetpgrp};
use psh_builtin::ShellProxy;
use psh_types::{Context, ExitStatus, PshError};
use std::ffi::CString;
use std::io::Write;
use std::os::unix::io::RawFd;
use tracing::{debug, error, warn};

use super::process::{CommandKind, Process};
use super::redirect::Redirect;
use super::signal::reset_job_control_signals;
use super::state::ProcessState;
use crate::shell::SHELL_TERMINAL;

/// Result of launching one stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LaunchOutcome {
    /// An external program is running under this pid.
    Spawned(Pid),
    /// A builtin ran to completion in-process.
    Builtin(ExitStatus),
}

impl LaunchOutcome {
    pub fn pid(&self) -> Option<Pid> {
        match self {
            LaunchOutcome::Spawned(pid) => Some(*pid),
            LaunchOutcome::Builtin(_) => None,
        }
    }
}

/// Launches `process` with `stdin`/`stdout` as its default endpoints.
///
/// `stdin` and `stdout` stay owned by the caller. Redirect files opened here
/// are closed before returning on every path. The first spawned stage fixes
/// `pgid`; later stages join that group.
pub fn launch_process(
    ctx: &Context,
    pgid: &mut Option<Pid>,
    process: &mut Process,
    stdin: RawFd,
    stdout: RawFd,
    proxy: &mut dyn ShellProxy,
) -> Result<LaunchOutcome> {
    let redirect = Redirect::open(process)?;
    let infile = redirect.stdin(stdin);
    let outfile = redirect.stdout(stdout);

    debug!(
        "🚀 LAUNCH: {} kind:{:?} infile:{} outfile:{}",
        process.cmd, process.kind, infile, outfile
    );

    match process.kind {
        CommandKind::Builtin(kind) => {
            let stage = ctx.with_io(infile, outfile);
            let status = psh_builtin::invoke(kind, &stage, &process.argv, proxy);
            process.state = ProcessState::Done(if status.is_failure() { 1 } else { 0 });
            debug!(
                "🚀 LAUNCH: builtin {} -> {:?} ({})",
                process.cmd,
                status,
                status.code()
            );
            Ok(LaunchOutcome::Builtin(status))
        }
        CommandKind::External => {
            let pid = fork_process(ctx, *pgid, process, infile, outfile)?;
            process.pid = Some(pid);
            let group = *pgid.get_or_insert(pid);

            // the child sets its group too; whichever runs second is a no-op
            if let Err(e) = setpgid(pid, group) {
                debug!("🔧 PGID: setpgid {} -> {} in parent: {}", pid, group, e);
            }
            if ctx.interactive && ctx.foreground {
                if let Err(e) = tcsetpgrp(SHELL_TERMINAL, group) {
                    warn!("🔧 PGID: tcsetpgrp {}: {}", group, e);
                }
            }
            Ok(LaunchOutcome::Spawned(pid))
        }
    }
}

fn fork_process(
    ctx: &Context,
    job_pgid: Option<Pid>,
    process: &Process,
    infile: RawFd,
    outfile: RawFd,
) -> Result<Pid> {
    if process.argv.is_empty() {
        return Err(PshError::EmptyCommand.into());
    }
    // allocate before forking; the child only execs or exits
    let argv = process
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<std::result::Result<Vec<CString>, _>>()
        .map_err(|_| PshError::NulArgument {
            cmd: process.argv[0].clone(),
        })?;

    // buffered output would otherwise be written twice
    std::io::stdout().flush().context("failed flush stdout")?;

    debug!("🍴 FORK: about to fork {:?}", argv);
    match unsafe { fork().map_err(PshError::Fork)? } {
        ForkResult::Parent { child } => {
            debug!("🍴 FORK: parent - child pid: {}", child);
            Ok(child)
        }
        ForkResult::Child => {
            let pid = getpid();
            exec_child(ctx, job_pgid.unwrap_or(pid), infile, outfile, &argv)
        }
    }
}

fn exec_child(ctx: &Context, pgid: Pid, infile: RawFd, outfile: RawFd, argv: &[CString]) -> ! {
    let _ = setpgid(Pid::from_raw(0), pgid);
    if ctx.interactive && ctx.foreground {
        let _ = tcsetpgrp(SHELL_TERMINAL, pgid);
    }
    if let Err(e) = reset_job_control_signals() {
        error!("🍴 FORK: child signal reset failed: {}", e);
    }

    if let Err(e) = copy_fd(infile, STDIN_FILENO).and_then(|_| copy_fd(outfile, STDOUT_FILENO)) {
        eprintln!("psh: {}", e);
        std::process::exit(1);
    }

    let err = match execvp(&argv[0], argv) {
        Ok(never) => match never {},
        Err(err) => err,
    };
    eprintln!("psh: {}: {}", argv[0].to_string_lossy(), err.desc());
    std::process::exit(1);
}

/// Moves `src` onto the standard slot `dst` unless it is already there.
fn copy_fd(src: RawFd, dst: RawFd) -> Result<()> {
    if src != dst {
        dup2(src, dst).with_context(|| format!("dup2 {src} -> {dst} failed"))?;
        close(src).with_context(|| format!("close {src} failed"))?;
    }
    Ok(())
}
