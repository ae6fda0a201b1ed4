//! Case-insensitive string helpers shared by the filter and parser

/// Whether `s` begins with `prefix`, ignoring case
pub(crate) fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    let mut chars = s.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|p| chars.next() == Some(p))
}

/// Byte offset of the first case-insensitive occurrence of `needle`
pub(crate) fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| starts_with_ignore_case(&haystack[i..], needle))
}

/// Whether `haystack` contains `needle`, ignoring case
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    find_ignore_case(haystack, needle).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ignore_case() {
        assert_eq!(find_ignore_case("Source: Level 10 Crypt", "level"), Some(8));
        assert_eq!(find_ignore_case("Cripta de nivel 10", "NIVEL"), Some(10));
        assert_eq!(find_ignore_case("Crypt", "Level"), None);
    }

    #[test]
    fn test_multibyte_offsets_stay_on_char_boundaries() {
        let text = "Épica de nivel 5";
        let pos = find_ignore_case(text, "nivel").unwrap();
        assert_eq!(&text[pos..], "nivel 5");
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("FROM: Bob", "from"));
        assert!(!starts_with_ignore_case("Fr", "from"));
    }
}
