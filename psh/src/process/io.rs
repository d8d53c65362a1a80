use libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use psh_types::{PshError, PshResult};
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use tracing::debug;

/// Read end of a pipe. Closed on drop.
#[derive(Debug)]
pub struct PipeReader(OwnedFd);

/// Write end of a pipe. Closed on drop.
#[derive(Debug)]
pub struct PipeWriter(OwnedFd);

impl AsRawFd for PipeReader {
    fn as_raw_fd(&self) -> RawFd {
        self.0.as_raw_fd()
    }
}

impl AsRawFd for PipeWriter {
    fn as_raw_fd(&self) -> RawFd {
        self.0.as_raw_fd()
    }
}

/// Creates a close-on-exec pipe. Only the copies duplicated onto a child's
/// standard slots survive `exec`.
pub fn create_pipe() -> PshResult<(PipeReader, PipeWriter)> {
    let (rd, wr) = pipe2(OFlag::O_CLOEXEC).map_err(PshError::Pipe)?;
    debug!("created pipe read:{} write:{}", rd, wr);
    // pipe2 hands back two fresh descriptors nobody else owns
    let (rd, wr) = unsafe { (OwnedFd::from_raw_fd(rd), OwnedFd::from_raw_fd(wr)) };
    Ok((PipeReader(rd), PipeWriter(wr)))
}

/// Input endpoint carried from one stage to the next.
#[derive(Debug)]
pub enum StageInput {
    Stdin,
    Pipe(PipeReader),
}

impl AsRawFd for StageInput {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            StageInput::Stdin => STDIN_FILENO,
            StageInput::Pipe(reader) => reader.as_raw_fd(),
        }
    }
}

/// Output endpoint of a stage.
#[derive(Debug)]
pub enum StageOutput {
    Stdout,
    Pipe(PipeWriter),
}

impl AsRawFd for StageOutput {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            StageOutput::Stdout => STDOUT_FILENO,
            StageOutput::Pipe(writer) => writer.as_raw_fd(),
        }
    }
}
