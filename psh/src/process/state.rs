use nix::sys::signal::Signal;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProcessState {
    Running,
    Done(i32),
    Suspended(Signal),
    Continued,
    Terminated(Signal),
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ProcessState::Running => formatter.write_str("running"),
            ProcessState::Done(_) => formatter.write_str("done"),
            ProcessState::Suspended(_) => formatter.write_str("suspended"),
            ProcessState::Continued => formatter.write_str("continued"),
            ProcessState::Terminated(signal) => {
                if signal == &Signal::SIGKILL {
                    formatter.write_str("killed")
                } else {
                    formatter.write_str("terminated")
                }
            }
        }
    }
}

/// Whether a job's caller waits for it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExecMode {
    Foreground,
    Background,
}
