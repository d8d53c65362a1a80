use super::ShellProxy;
use psh_types::{Context, ExitStatus};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tracing::debug;

/// Built-in mypid command implementation
/// `-i` prints the shell pid, `-p <pid>` the parent of pid, `-c <pid>` its children
pub fn command(ctx: &Context, argv: &[String], _proxy: &mut dyn ShellProxy) -> ExitStatus {
    let Some(opt) = argv.get(1).map(|s| s.as_str()) else {
        ctx.write_stderr("usage: mypid [-i|-p|-c] [pid]").ok();
        return ExitStatus::Failed;
    };

    if opt == "-i" {
        return write(ctx, &format!("{}\n", ctx.shell_pid));
    }

    if opt != "-p" && opt != "-c" {
        ctx.write_stderr(&format!("mypid: invalid option {opt}")).ok();
        return ExitStatus::Failed;
    }

    let Some(arg) = argv.get(2) else {
        ctx.write_stderr(&format!("mypid {opt}: missing pid argument"))
            .ok();
        return ExitStatus::Failed;
    };
    let Ok(target) = arg.parse::<u32>() else {
        ctx.write_stderr(&format!("mypid {opt}: invalid pid {arg}")).ok();
        return ExitStatus::Failed;
    };
    let target = Pid::from_u32(target);

    if opt == "-p" {
        match parent_pid(target) {
            Some(ppid) => write(ctx, &format!("{ppid}\n")),
            None => {
                ctx.write_stderr("mypid -p: process id not exist").ok();
                ExitStatus::Failed
            }
        }
    } else {
        match child_pids(target) {
            Some(children) => {
                let out: String = children.iter().map(|pid| format!("{pid}\n")).collect();
                write(ctx, &out)
            }
            None => {
                ctx.write_stderr("mypid -c: process id not exist").ok();
                ExitStatus::Failed
            }
        }
    }
}

fn write(ctx: &Context, out: &str) -> ExitStatus {
    match ctx.write_out(out) {
        Ok(_) => ExitStatus::Handled,
        Err(err) => {
            ctx.write_stderr(&format!("mypid: {err}")).ok();
            ExitStatus::Failed
        }
    }
}

/// Parent of `pid`, `0` for a process without one, `None` when `pid` does not exist.
fn parent_pid(pid: Pid) -> Option<u32> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    let parent = system
        .process(pid)
        .map(|proc| proc.parent().map(|p| p.as_u32()).unwrap_or(0));
    debug!("mypid: parent of {} -> {:?}", pid, parent);
    parent
}

/// Live processes whose parent is `pid`, in ascending order. `None` when `pid`
/// does not exist.
fn child_pids(pid: Pid) -> Option<Vec<u32>> {
    let system = System::new_with_specifics(
        RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing()),
    );
    system.process(pid)?;
    let mut children: Vec<u32> = system
        .processes()
        .iter()
        .filter(|(_, proc)| proc.thread_kind().is_none() && proc.parent() == Some(pid))
        .map(|(child, _)| child.as_u32())
        .collect();
    children.sort_unstable();
    debug!("mypid: children of {} -> {:?}", pid, children);
    Some(children)
}
