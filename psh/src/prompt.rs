use crate::environment::Environment;
use std::io::Write;

pub const DEFAULT_PROMPT: &str = "{user}:{cwd} >>> $ ";

/// Expands `{user}` and `{cwd}` in `template`.
pub fn render(template: &str, env: &Environment) -> String {
    template
        .replace("{user}", &env.user)
        .replace("{cwd}", &env.cwd.to_string_lossy())
}

pub fn print_prompt<W: Write>(out: &mut W, template: Option<&str>, env: &Environment) {
    let prompt = render(template.unwrap_or(DEFAULT_PROMPT), env);
    write!(out, "{prompt}").ok();
    out.flush().ok();
}
