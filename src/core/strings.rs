//! Small string helpers

/// Strip characters unsafe for filesystem paths from a plugin title
///
/// Whitespace collapses to single underscores; alphanumerics, `-`, `_` and
/// `.` pass through; everything else is dropped. The result is stable for
/// repeated application.
pub fn sanitize_for_path(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_sep = true;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_sep {
                out.push('_');
                last_was_sep = true;
            }
        } else if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
            out.push(c);
            last_was_sep = false;
        }
        // Anything else (path separators, shell metacharacters) is dropped
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(sanitize_for_path("Web Vulnerability Scanners"), "Web_Vulnerability_Scanners");
    }

    #[test]
    fn test_unsafe_characters_dropped() {
        assert_eq!(sanitize_for_path("a/b\\c:d*e"), "abcde");
        assert_eq!(sanitize_for_path("Testing_for_SSL-TLS"), "Testing_for_SSL-TLS");
    }

    #[test]
    fn test_idempotent() {
        let once = sanitize_for_path("SSL / TLS  probe!");
        assert_eq!(sanitize_for_path(&once), once);
    }

    #[test]
    fn test_trailing_separators_trimmed() {
        assert_eq!(sanitize_for_path("scan "), "scan");
        assert_eq!(sanitize_for_path("  "), "");
    }
}
