//! Name sanitization
//!
//! Maps arbitrary client-supplied names (upload filenames, rename targets,
//! new directory names) onto a safe single path component.

/// Longest name accepted by common filesystems, in bytes.
pub const MAX_NAME_LENGTH: usize = 255;

const RESERVED_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Sanitizes a single entry name using an allow-list.
///
/// Separators become whitespace, whitespace runs become `_`, and then only
/// ASCII alphanumerics, `_`, `.` and `-` survive. Leading and trailing `.`
/// and `_` are stripped, which also removes any `..` left at the edges.
/// Windows device names get a `_` prefix.
///
/// Returns `None` when nothing usable remains; callers must reject the
/// request rather than fall back to an empty name.
pub fn sanitize_name(name: &str) -> Option<String> {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let mut safe = filtered.trim_matches(|c| c == '.' || c == '_').to_string();
    if safe.is_empty() {
        return None;
    }

    let stem = safe.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if RESERVED_DEVICE_NAMES.contains(&stem.as_str()) {
        safe.insert(0, '_');
    }

    // ASCII only at this point, so byte truncation cannot split a char.
    safe.truncate(MAX_NAME_LENGTH);
    Some(safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_unchanged() {
        assert_eq!(sanitize_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(sanitize_name("a-b_c.tar.gz").as_deref(), Some("a-b_c.tar.gz"));
    }

    #[test]
    fn test_whitespace_becomes_underscore() {
        assert_eq!(
            sanitize_name("My  cool\tmovie.mov").as_deref(),
            Some("My_cool_movie.mov")
        );
    }

    #[test]
    fn test_separators_are_flattened() {
        assert_eq!(sanitize_name("sub/name.txt").as_deref(), Some("sub_name.txt"));
        assert_eq!(
            sanitize_name("../../../etc/passwd").as_deref(),
            Some("etc_passwd")
        );
        assert_eq!(
            sanitize_name("..\\..\\boot.ini").as_deref(),
            Some("boot.ini")
        );
        assert_eq!(sanitize_name("/leading").as_deref(), Some("leading"));
    }

    #[test]
    fn test_unsafe_characters_are_dropped() {
        assert_eq!(sanitize_name("a<b>c:d|e?.txt").as_deref(), Some("abcde.txt"));
        assert_eq!(sanitize_name("naïve.txt").as_deref(), Some("nave.txt"));
        assert_eq!(sanitize_name("x\0y").as_deref(), Some("xy"));
    }

    #[test]
    fn test_empty_results_are_rejected() {
        assert_eq!(sanitize_name(""), None);
        assert_eq!(sanitize_name("/"), None);
        assert_eq!(sanitize_name(".."), None);
        assert_eq!(sanitize_name("  "), None);
        assert_eq!(sanitize_name("日本語"), None);
    }

    #[test]
    fn test_device_names_are_prefixed() {
        assert_eq!(sanitize_name("con").as_deref(), Some("_con"));
        assert_eq!(sanitize_name("LPT1.txt").as_deref(), Some("_LPT1.txt"));
        assert_eq!(sanitize_name("console").as_deref(), Some("console"));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let long = "a".repeat(400);
        assert_eq!(sanitize_name(&long).unwrap().len(), MAX_NAME_LENGTH);
    }
}
