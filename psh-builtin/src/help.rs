use super::ShellProxy;
use psh_types::{Context, ExitStatus};

/// Built-in help command implementation
/// Displays a list of all available built-in commands with their descriptions
pub fn command(ctx: &Context, _argv: &[String], proxy: &mut dyn ShellProxy) -> ExitStatus {
    let history_size = proxy.history_capacity();
    let record = format!("Show last {history_size} commands");
    let commands = [
        ("help", "Show this help menu"),
        ("cd [dir]", "Change directory to [dir] or $HOME"),
        ("echo [-n]", "Print arguments"),
        ("record", record.as_str()),
        ("replay N", "Re-execute command #N from history"),
        ("mypid [-i|-p|-c] [pid]", "Show process IDs"),
        ("exit", "Exit the shell"),
    ];

    let rule = "-".repeat(32);
    let mut help_text = format!("{rule}\nBuilt-in commands:\n");
    for (cmd, description) in commands {
        help_text.push_str(&format!("  {:<24}{}\n", cmd, description));
    }
    help_text.push_str(&rule);

    match ctx.write_stdout(&help_text) {
        Ok(_) => ExitStatus::Handled,
        Err(err) => {
            ctx.write_stderr(&format!("help: failed to display help: {err}"))
                .ok();
            ExitStatus::Failed
        }
    }
}
