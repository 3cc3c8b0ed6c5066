use std::collections::HashMap;

/// Dice coefficient over character bigrams: 2·|A∩B| / (|A|+|B|), with
/// multiset intersection. Deterministic, symmetric, 0.0..=1.0.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_grams = bigrams(a);
    let b_grams = bigrams(b);
    if a_grams.is_empty() || b_grams.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for gram in &a_grams {
        *counts.entry(*gram).or_default() += 1;
    }

    let mut overlap = 0usize;
    for gram in &b_grams {
        if let Some(count) = counts.get_mut(gram) {
            if *count > 0 {
                *count -= 1;
                overlap += 1;
            }
        }
    }

    (2.0 * overlap as f64) / (a_grams.len() + b_grams.len()) as f64
}

fn bigrams(text: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(2).map(|pair| (pair[0], pair[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(similarity_ratio("opening hours", "opening hours"), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn similar_questions_score_high() {
        let score = similarity_ratio(
            "how much does the service cost",
            "how much does it cost",
        );
        assert!(score > 0.6, "got {}", score);
    }

    #[test]
    fn ratio_is_symmetric() {
        let forward = similarity_ratio("where can i park", "where do i park");
        let backward = similarity_ratio("where do i park", "where can i park");
        assert!((forward - backward).abs() < 1e-12);
    }

    #[test]
    fn empty_input_scores_zero_against_text() {
        assert_eq!(similarity_ratio("", "anything"), 0.0);
    }
}
