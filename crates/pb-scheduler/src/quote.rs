//! POSIX shell quoting for `{}`-substitution mode, equivalent to Python's
//! `shlex.quote`.

/// Characters considered safe to leave unquoted, per `shlex.quote`'s own
/// `_find_unsafe` pattern.
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%_-+=:,./".contains(c)
}

/// Quote `s` for safe inclusion as a single shell word.
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_shell_safe) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r#"'"'"'"#))
}
