use super::ShellProxy;
use psh_types::{Context, ExitStatus};

/// Built-in echo command implementation
/// `-n` as the first argument suppresses the trailing newline
pub fn command(ctx: &Context, argv: &[String], _proxy: &mut dyn ShellProxy) -> ExitStatus {
    let args = argv.get(1..).unwrap_or_default();
    let (newline, words) = match args.first().map(|s| s.as_str()) {
        Some("-n") => (false, &args[1..]),
        _ => (true, args),
    };

    let mut out = words.join(" ");
    if newline {
        out.push('\n');
    }

    match ctx.write_out(&out) {
        Ok(_) => ExitStatus::Handled,
        Err(err) => {
            ctx.write_stderr(&format!("echo: {err}")).ok();
            ExitStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Capture, MockProxy, argv};

    fn echo(args: &[&str]) -> String {
        let mut cap = Capture::new();
        let status = command(&cap.context(), &argv(args), &mut MockProxy::default());
        assert_eq!(status, ExitStatus::Handled);
        cap.stdout()
    }

    #[test]
    fn joins_arguments() {
        assert_eq!(echo(&["echo", "a", "b"]), "a b\n");
    }

    #[test]
    fn no_newline_flag() {
        assert_eq!(echo(&["echo", "-n", "a", "b"]), "a b");
        assert_eq!(echo(&["echo", "-n"]), "");
    }

    #[test]
    fn flag_only_counts_in_first_position() {
        assert_eq!(echo(&["echo", "a", "-n"]), "a -n\n");
        assert_eq!(echo(&["echo"]), "\n");
    }
}
