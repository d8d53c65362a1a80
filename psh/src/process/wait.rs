use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::{debug, error};

use super::state::ProcessState;

/// Blocks until `pid` exits or stops.
///
/// Returns `None` if the wait failed; the caller treats the process as gone.
pub fn wait_pid_job(pid: Pid) -> Option<ProcessState> {
    debug!("WAIT_PID_START: waitpid for pid: {}", pid);
    loop {
        let state = match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(pid, status)) => {
                debug!("WAIT_PID_EXITED: {} exited with status: {}", pid, status);
                ProcessState::Done(status)
            }
            Ok(WaitStatus::Signaled(pid, signal, core_dumped)) => {
                debug!(
                    "WAIT_PID_SIGNALED: {} killed by signal: {:?}, core_dumped: {}",
                    pid, signal, core_dumped
                );
                ProcessState::Terminated(signal)
            }
            Ok(WaitStatus::Stopped(pid, signal)) => {
                debug!("WAIT_PID_STOPPED: {} stopped by signal: {:?}", pid, signal);
                ProcessState::Suspended(signal)
            }
            Ok(WaitStatus::Continued(pid)) => {
                debug!("WAIT_PID_CONTINUED: {} continued", pid);
                continue;
            }
            Err(nix::errno::Errno::EINTR) => continue,
            Err(nix::errno::Errno::ECHILD) => {
                debug!("WAIT_PID_ECHILD: no child process {}", pid);
                return None;
            }
            status => {
                error!(
                    "WAIT_PID_UNEXPECTED: unexpected waitpid status for pid {}: {:?}",
                    pid, status
                );
                return None;
            }
        };
        return Some(state);
    }
}
