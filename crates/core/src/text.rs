/// Canonicalize raw user text: trim, lowercase, drop everything that is not
/// a word character or whitespace, collapse whitespace runs to one space.
pub fn clean(raw: &str) -> String {
    let stripped: String = raw
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_' || ch.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_collapses_whitespace() {
        assert_eq!(clean("  Hi, There!! "), "hi there");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("  ?!  "), "");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let once = clean("What's  UP, friend?");
        assert_eq!(clean(&once), once);
    }
}
