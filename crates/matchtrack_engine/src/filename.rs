use matchtrack_core::DEFAULT_RESULT_FILE_NAME;

const MAX_NAME_LEN: usize = 120;

/// Local save name for a result artifact.
///
/// The service-reported name is reduced to its last path component and made
/// Windows-safe; an empty or missing name falls back to the default.
pub fn result_file_name(reported: Option<&str>) -> String {
    let Some(reported) = reported else {
        return DEFAULT_RESULT_FILE_NAME.to_string();
    };
    let last = reported
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reported);

    let cleaned: String = last
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = collapse_underscores(cleaned.trim_matches(&['_', ' ', '.'][..]));
    if cleaned.is_empty() {
        return DEFAULT_RESULT_FILE_NAME.to_string();
    }

    let mut name = truncate_keeping_extension(&cleaned, MAX_NAME_LEN);
    if is_reserved_windows_name(stem(&name)) {
        let at = stem(&name).len();
        name.insert(at, '_');
    }
    name
}

fn collapse_underscores(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    compacted
}

fn truncate_keeping_extension(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let (base, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 && name.len() - idx <= 10 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };
    let keep = max_chars.saturating_sub(ext.chars().count());
    let mut truncated: String = base.chars().take(keep).collect();
    truncated.push_str(ext);
    truncated
}

fn stem(name: &str) -> &str {
    match name.find('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
