use super::ShellProxy;
use psh_types::{Context, ExitStatus};

/// Built-in replay command implementation
/// Substitution happens before parsing, so reaching this handler means the
/// line could not be replayed
pub fn command(ctx: &Context, argv: &[String], proxy: &mut dyn ShellProxy) -> ExitStatus {
    if argv.len() != 2 {
        ctx.write_stderr("usage: replay N").ok();
        return ExitStatus::Failed;
    }

    let len = proxy.history().len();
    match argv[1].parse::<usize>() {
        Ok(idx) if (1..=len).contains(&idx) => {
            ctx.write_stderr("replay: unexpected error").ok();
        }
        _ => {
            ctx.write_stderr(&format!("replay: invalid index {}", argv[1]))
                .ok();
        }
    }
    ExitStatus::Failed
}
