const PNG_SUFFIX: &str = ".png";

/// Turns a path segment such as `Notch.png` back into a nickname.
///
/// Only names ending in `.png` are touched, and those are cut at their first
/// dot, so `foo.bar.png` yields `foo`.
pub fn strip_png_suffix(raw: &str) -> &str {
    if !raw.ends_with(PNG_SUFFIX) {
        return raw;
    }

    raw.split('.').next().unwrap_or(raw)
}

/// Lookup key for the record store.
pub fn normalize(nickname: &str) -> String {
    nickname.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_png_suffix() {
        assert_eq!(strip_png_suffix("Notch.png"), "Notch");
        assert_eq!(strip_png_suffix("Notch"), "Notch");
        assert_eq!(strip_png_suffix("foo.bar.png"), "foo");
        assert_eq!(strip_png_suffix("foo.bar"), "foo.bar");
        assert_eq!(strip_png_suffix(".png"), "");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("ErickSkrauch"), "erickskrauch");
        assert_eq!(normalize("already_lower"), "already_lower");
    }
}
