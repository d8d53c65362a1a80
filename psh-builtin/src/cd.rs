use super::ShellProxy;
use psh_types::{Context, ExitStatus};
use tracing::debug;

/// Built-in cd command implementation
/// Changes to `argv[1]`, or to the home directory when no argument is given
pub fn command(ctx: &Context, argv: &[String], proxy: &mut dyn ShellProxy) -> ExitStatus {
    let dir = match argv.get(1) {
        Some(dir) => dir.to_string(),
        None => match proxy.home_dir() {
            Some(home_dir) => home_dir.to_string_lossy().into_owned(),
            None => String::from("/"),
        },
    };

    debug!("cd {}", dir);
    match proxy.changepwd(&dir) {
        Ok(_) => ExitStatus::Handled,
        Err(err) => {
            ctx.write_stderr(&format!("cd: {}: {}", dir, err)).ok();
            ExitStatus::Failed
        }
    }
}
