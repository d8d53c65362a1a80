use tracing::debug;

/// Formats an error the way it is shown to the user, without backtraces.
pub fn user_message(err: &anyhow::Error) -> String {
    format!("psh: {err}")
}

/// Prints `err` on stderr. The read-eval loop keeps going afterwards.
pub fn display_user_error(err: &anyhow::Error) {
    debug!("command failed: {:?}", err);
    eprintln!("{}", user_message(err));
}
