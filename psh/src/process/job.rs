use anyhow::Result;
use nix::unistd::{Pid, tcsetpgrp};
use psh_builtin::ShellProxy;
use psh_types::Context;
use std::os::unix::io::AsRawFd;
use tracing::{debug, error, warn};

use super::fork::launch_process;
use super::io::{StageInput, StageOutput, create_pipe};
use super::process::Process;
use super::state::{ExecMode, ProcessState};
use super::wait::wait_pid_job;
use crate::shell::SHELL_TERMINAL;
use crate::shell::job_table::{JobEntry, JobTable};

/// A pipeline: the stages of one command line and their shared process group.
#[derive(Debug)]
pub struct Job {
    pub(crate) id: Option<usize>,
    pub(crate) pgid: Option<Pid>,
    pub(crate) mode: ExecMode,
    pub(crate) cmd: String,
    pub(crate) processes: Vec<Process>,
}

impl Job {
    /// `processes` must hold at least one stage.
    pub fn new(cmd: String, mode: ExecMode, processes: Vec<Process>) -> Self {
        debug_assert!(!processes.is_empty(), "a job needs at least one stage");
        Job {
            id: None,
            pgid: None,
            mode,
            cmd,
            processes,
        }
    }

    pub fn id(&self) -> Option<usize> {
        self.id
    }

    pub fn pgid(&self) -> Option<Pid> {
        self.pgid
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn is_foreground(&self) -> bool {
        self.mode == ExecMode::Foreground
    }

    /// Pid of the last stage if it is an external program.
    pub fn representative_pid(&self) -> Option<Pid> {
        self.processes.last().and_then(|p| p.pid)
    }

    /// State of the last stage.
    pub fn last_process_state(&self) -> ProcessState {
        self.processes
            .last()
            .map(|p| p.state)
            .unwrap_or(ProcessState::Done(0))
    }

    /// Runs the pipeline.
    ///
    /// Background jobs take the first free slot of `jobs` before any stage
    /// starts. A stage that fails to launch stops the pipeline; stages already
    /// running are left alone.
    pub fn launch(
        &mut self,
        ctx: &Context,
        jobs: &mut JobTable,
        proxy: &mut dyn ShellProxy,
    ) -> Result<ProcessState> {
        debug!(
            "JOB_LAUNCH_START: cmd: '{}' mode: {:?} stages: {}",
            self.cmd,
            self.mode,
            self.processes.len()
        );

        if self.mode == ExecMode::Background {
            self.id = jobs.register(JobEntry::new(&self.cmd));
            if self.id.is_none() {
                warn!("job table full, '{}' runs unregistered", self.cmd);
            }
        }

        let mut ctx = ctx.clone();
        ctx.foreground = self.is_foreground();

        let launched = self.launch_stages(&ctx, proxy);
        if let Some(slot) = self.id {
            jobs.set_pgid(slot, self.pgid);
        }
        if let Err(err) = launched {
            error!("JOB_LAUNCH_ERROR: '{}': {}", self.cmd, err);
            self.restore_terminal(&ctx);
            return Err(err);
        }

        match self.mode {
            ExecMode::Foreground => {
                self.wait_job();
                self.restore_terminal(&ctx);
                Ok(self.last_process_state())
            }
            ExecMode::Background => {
                self.show_job_status(&ctx)?;
                Ok(ProcessState::Running)
            }
        }
    }

    fn launch_stages(&mut self, ctx: &Context, proxy: &mut dyn ShellProxy) -> Result<()> {
        let last = self.processes.len().saturating_sub(1);
        let mut input = StageInput::Stdin;

        for (index, process) in self.processes.iter_mut().enumerate() {
            let (output, next_input) = if index < last {
                let (reader, writer) = create_pipe()?;
                (StageOutput::Pipe(writer), Some(reader))
            } else {
                (StageOutput::Stdout, None)
            };

            // on error every endpoint still in scope closes here
            let outcome = launch_process(
                ctx,
                &mut self.pgid,
                process,
                input.as_raw_fd(),
                output.as_raw_fd(),
                proxy,
            )?;
            debug!(
                "JOB_LAUNCH_STAGE: {} '{}' -> {:?} pgid: {:?}",
                index, process.cmd, outcome, self.pgid
            );

            // the write end now lives only in the child
            drop(output);
            if let Some(reader) = next_input {
                input = StageInput::Pipe(reader);
            }
        }
        Ok(())
    }

    /// Waits for every external stage, in pipeline order.
    fn wait_job(&mut self) {
        for process in self.processes.iter_mut().filter(|p| p.kind.is_external()) {
            let Some(pid) = process.pid else { continue };
            match wait_pid_job(pid) {
                Some(state) => process.state = state,
                None => process.state = ProcessState::Done(1),
            }
            debug!("JOB_WAIT: {} pid: {} -> {}", process.cmd, pid, process.state);
        }
    }

    fn restore_terminal(&self, ctx: &Context) {
        if ctx.interactive && ctx.foreground && self.pgid.is_some() {
            if let Err(e) = tcsetpgrp(SHELL_TERMINAL, ctx.shell_pgid) {
                warn!("failed to take back the terminal: {}", e);
            }
        }
    }

    /// Background notice: representative pid, then `[slot] pgid`.
    fn show_job_status(&self, ctx: &Context) -> Result<()> {
        if let Some(pid) = self.representative_pid() {
            ctx.write_stdout(&pid.to_string())?;
        }
        if let Some(slot) = self.id {
            let pgid = self.pgid.map(|p| p.as_raw()).unwrap_or(0);
            ctx.write_stdout(&format!("[{slot}] {pgid}"))?;
        }
        Ok(())
    }
}
