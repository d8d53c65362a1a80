#![allow(clippy::module_inception)]

pub mod fork;
pub mod io;
pub mod job;
pub mod process;
pub mod redirect;
pub mod signal;
pub mod state;
pub mod wait;

pub use fork::{LaunchOutcome, launch_process};
pub use io::{PipeReader, PipeWriter, StageInput, StageOutput, create_pipe};
pub use job::Job;
pub use process::{CommandKind, Process};
pub use redirect::Redirect;
pub use state::{ExecMode, ProcessState};
pub use wait::wait_pid_job;
