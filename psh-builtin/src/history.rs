use super::ShellProxy;
use psh_types::{Context, ExitStatus};

/// Built-in record command implementation
/// Lists the processed history, numbered from 1
pub fn command(ctx: &Context, _argv: &[String], proxy: &mut dyn ShellProxy) -> ExitStatus {
    let out: String = proxy
        .history()
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:2}  {}\n", i + 1, line))
        .collect();

    match ctx.write_out(&out) {
        Ok(_) => ExitStatus::Handled,
        Err(err) => {
            ctx.write_stderr(&format!("record: {err}")).ok();
            ExitStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Capture, MockProxy, argv};

    #[test]
    fn numbers_entries_from_one() {
        let mut cap = Capture::new();
        let mut proxy = MockProxy {
            history: argv(&["ls -l", "echo hi", "record"]),
            ..Default::default()
        };
        let status = command(&cap.context(), &argv(&["record"]), &mut proxy);
        assert_eq!(status, ExitStatus::Handled);
        assert_eq!(cap.stdout(), " 1  ls -l\n 2  echo hi\n 3  record\n");
    }
}
