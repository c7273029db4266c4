//! Deterministic file naming derived from game names.

/// Make a filesystem-safe, lowercase name from a game title.
///
/// Illegal filename characters, spaces and dashes become `_`; runs of `_`
/// collapse and are trimmed from both ends.
pub fn safe_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let mapped = match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | ' ' | '-' => '_',
            other => other,
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.extend(mapped.to_lowercase());
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name_basic() {
        assert_eq!(safe_name("Elden Ring Nightreign"), "elden_ring_nightreign");
        assert_eq!(safe_name("Hearts of Iron IV"), "hearts_of_iron_iv");
    }

    #[test]
    fn test_safe_name_collapses_and_trims() {
        assert_eq!(safe_name("  Half-Life: Alyx  "), "half_life_alyx");
        assert_eq!(safe_name("a//b??c"), "a_b_c");
        assert_eq!(safe_name("---"), "");
    }
}
