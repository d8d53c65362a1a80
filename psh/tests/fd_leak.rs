use std::fs;

use psh::config::Config;
use psh::shell::Shell;
use tempfile::TempDir;

fn open_fds() -> usize {
    fs::read_dir("/proc/self/fd")
        .expect("read /proc/self/fd")
        .count()
}

// Kept alone in this file so no other test opens descriptors meanwhile.
#[test]
fn launches_leave_no_descriptor_behind() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let missing = dir.path().join("missing.txt");
    let mut shell = Shell::new(Config::default());
    let ctx = shell.context(false);

    let before = open_fds();

    let failing = format!("echo hi | cat < {} | wc -c", missing.display());
    assert!(shell.eval_str(&ctx, &failing).is_err());
    assert_eq!(open_fds(), before, "after failed input redirect");

    let bad_output = format!("echo hi | cat > {}", dir.path().join("no/dir/out").display());
    assert!(shell.eval_str(&ctx, &bad_output).is_err());
    assert_eq!(open_fds(), before, "after failed output redirect");

    let working = format!("echo hi | cat | cat > {}", out.display());
    shell.eval_str(&ctx, &working).unwrap();
    assert_eq!(open_fds(), before, "after a complete pipeline");
    assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");

    let builtin_redirect = format!("echo -n again > {}", out.display());
    shell.eval_str(&ctx, &builtin_redirect).unwrap();
    assert_eq!(open_fds(), before, "after a builtin redirect");
    assert_eq!(fs::read_to_string(&out).unwrap(), "again");
}
