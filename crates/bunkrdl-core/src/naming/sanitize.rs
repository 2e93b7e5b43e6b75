//! Display-name sanitization and extension policy.

/// Longest filename most filesystems accept, in bytes.
pub const NAME_MAX: usize = 255;

/// Characters that may not appear in a suggested filename.
const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitizes a display name for use as a download filename.
///
/// - Replaces every run of `\ / : * ? " < > |` with a single space
/// - Collapses consecutive whitespace to one space
/// - Trims leading/trailing whitespace
///
/// Applying it twice gives the same result as applying it once.
pub fn sanitize_display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for c in name.chars() {
        if FORBIDDEN.contains(&c) || c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

/// True if `name` ends in a dot followed by 2–5 ASCII alphanumerics.
pub fn has_plausible_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        (2..=5).contains(&ext.len()) && ext.bytes().all(|b| b.is_ascii_alphanumeric())
    })
}

/// Appends `.bin` unless the name already carries a plausible extension.
pub fn ensure_extension(name: &str) -> String {
    if has_plausible_extension(name) {
        name.to_string()
    } else {
        format!("{name}.bin")
    }
}

/// Limits `name` to [`NAME_MAX`] bytes, cutting the stem on a char boundary
/// and keeping a plausible extension intact.
pub fn truncate_to_name_max(name: &str) -> String {
    if name.len() <= NAME_MAX {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if has_plausible_extension(name) => (stem, ext),
        _ => (name, ""),
    };
    let suffix = if ext.is_empty() {
        String::new()
    } else {
        format!(".{ext}")
    };
    let mut take = NAME_MAX - suffix.len();
    while take > 0 && !stem.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}{suffix}", stem[..take].trim_end())
}
