use anyhow::Result;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use tracing::debug;

/// Signals an interactive shell ignores and its children get back.
pub(crate) const JOB_CONTROL_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

pub(crate) fn ignore_job_control_signals() -> Result<()> {
    debug!("🔧 SIGNAL: ignoring job control signals");
    set_handler(&JOB_CONTROL_SIGNALS, SigHandler::SigIgn)
}

/// Restores default dispositions in a freshly forked child.
///
/// SIGPIPE is ignored by the Rust runtime at startup and an ignored
/// disposition survives `exec`, so it is reset along with the job control set.
pub(crate) fn reset_job_control_signals() -> Result<()> {
    set_handler(&JOB_CONTROL_SIGNALS, SigHandler::SigDfl)?;
    set_handler(&[Signal::SIGPIPE], SigHandler::SigDfl)
}

fn set_handler(signals: &[Signal], handler: SigHandler) -> Result<()> {
    let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
    for &signal in signals {
        unsafe {
            sigaction(signal, &action)
                .map_err(|e| anyhow::anyhow!("failed to set {:?} handler: {}", signal, e))?;
        }
    }
    Ok(())
}
