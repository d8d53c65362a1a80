use psh_types::{PshError, PshResult};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use tracing::debug;

use super::process::Process;

/// Files opened for a stage's `<` and `>` redirections.
///
/// The files belong to the launcher and are closed when this value drops,
/// whatever path the launch takes.
#[derive(Debug, Default)]
pub struct Redirect {
    input: Option<File>,
    output: Option<File>,
}

impl Redirect {
    /// Opens the input file read-only, then the output file for writing
    /// (create, truncate, mode 0644). When the output fails the input is
    /// released before the error is returned.
    pub fn open(process: &Process) -> PshResult<Self> {
        let input = match process.infile() {
            Some(path) => Some(File::open(path).map_err(|source| PshError::Redirect {
                path: path.to_string(),
                source,
            })?),
            None => None,
        };

        let output = match process.outfile() {
            Some(path) => Some(
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .mode(0o644)
                    .open(path)
                    .map_err(|source| PshError::Redirect {
                        path: path.to_string(),
                        source,
                    })?,
            ),
            None => None,
        };

        debug!(
            "redirect infile:{:?} outfile:{:?}",
            input.as_ref().map(|f| f.as_raw_fd()),
            output.as_ref().map(|f| f.as_raw_fd())
        );
        Ok(Redirect { input, output })
    }

    /// Effective input: the redirect file if any, else the caller's endpoint.
    pub fn stdin(&self, fallback: RawFd) -> RawFd {
        self.input.as_ref().map_or(fallback, |f| f.as_raw_fd())
    }

    /// Effective output: the redirect file if any, else the caller's endpoint.
    pub fn stdout(&self, fallback: RawFd) -> RawFd {
        self.output.as_ref().map_or(fallback, |f| f.as_raw_fd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn process(infile: Option<String>, outfile: Option<String>) -> Process {
        Process::new("cat".into(), vec!["cat".into()], infile, outfile)
    }

    #[test]
    fn without_paths_uses_caller_endpoints() {
        let redirect = Redirect::open(&process(None, None)).unwrap();
        assert_eq!(redirect.stdin(7), 7);
        assert_eq!(redirect.stdout(9), 9);
    }

    #[test]
    fn output_is_truncated_with_mode_0644() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        fs::write(&out, "previous contents").unwrap();

        let redirect =
            Redirect::open(&process(None, Some(out.display().to_string()))).unwrap();
        assert_ne!(redirect.stdout(1), 1);
        drop(redirect);
        assert_eq!(fs::read_to_string(&out).unwrap(), "");

        let created = dir.path().join("created.txt");
        let redirect =
            Redirect::open(&process(None, Some(created.display().to_string()))).unwrap();
        nix::unistd::write(redirect.stdout(1), b"x").unwrap();
        drop(redirect);
        let mode = fs::metadata(&created).unwrap().permissions().mode();
        // umask can only clear bits
        assert_eq!(mode & 0o777 & !0o644, 0);
        assert_eq!(fs::read_to_string(&created).unwrap(), "x");
    }

    #[test]
    fn missing_input_names_the_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.txt").display().to_string();
        let err = Redirect::open(&process(Some(missing.clone()), None)).unwrap_err();
        assert!(matches!(err, PshError::Redirect { ref path, .. } if *path == missing));
    }

    #[test]
    fn bad_output_fails_after_input_opened() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.txt");
        fs::write(&input, "data").unwrap();
        let output = dir.path().join("no/such/dir/out.txt").display().to_string();

        let err = Redirect::open(&process(
            Some(input.display().to_string()),
            Some(output.clone()),
        ))
        .unwrap_err();
        assert!(matches!(err, PshError::Redirect { ref path, .. } if *path == output));
    }
}
