use std::collections::HashMap;

/// Ratcliff/Obershelp matcher with one side fixed.
///
/// The fixed text is indexed once (character → positions), so comparing many messages
/// against the same conversation text only pays for the index a single time. Every character
/// takes part in matching; there is no junk or popularity filter.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
}

impl TextMatcher {
    pub fn new(text: &str) -> Self {
        let b: Vec<char> = text.chars().collect();
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }
        Self { b, b2j }
    }

    /// Similarity of `text` to the fixed text: `2 * matched / total_len`, in `[0, 1]`.
    /// Two empty strings are identical (1.0).
    pub fn ratio(&self, text: &str) -> f64 {
        let a: Vec<char> = text.chars().collect();
        let total = a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * self.matched_chars(&a) as f64 / total as f64
    }

    /// Total size of the matching blocks: the longest common block, then recursively
    /// the longest blocks to its left and right.
    fn matched_chars(&self, a: &[char]) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.longest_match(a, alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given ranges. Among equally long
    /// blocks the one starting earliest in `a`, then earliest in `b`, wins.
    fn longest_match(
        &self,
        a: &[char],
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
        // j -> length of the match ending at a[i - 1], b[j]
        let mut run_lengths: HashMap<usize, usize> = HashMap::new();

        for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(c) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_lengths.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            run_lengths = next;
        }

        (best_i, best_j, best_k)
    }
}

/// One-off similarity between two strings
///
/// # Examples
///
/// ```
/// use chat_archive_explorer::reconcile::similarity_ratio;
///
/// assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
/// assert_eq!(similarity_ratio("", ""), 1.0);
/// ```
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    TextMatcher::new(b).ratio(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_identical_and_disjoint() {
        assert_close(similarity_ratio("same text", "same text"), 1.0);
        assert_close(similarity_ratio("abc", "xyz"), 0.0);
        assert_close(similarity_ratio("hello", ""), 0.0);
        assert_close(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn test_known_ratios() {
        assert_close(similarity_ratio("abcd", "bcde"), 0.75);
        assert_close(similarity_ratio("hello world", "Greetings"), 0.1);
        assert_close(
            similarity_ratio(
                "quarterly budget report discussion",
                "Discussing the quarterly budget report",
            ),
            46.0 / 72.0,
        );
    }

    #[test]
    fn test_matcher_is_reusable() {
        let matcher = TextMatcher::new("Discussing the quarterly budget report");
        let first = matcher.ratio("quarterly budget report discussion");
        let second = matcher.ratio("quarterly budget report discussion");
        assert_close(first, second);
        assert!(matcher.ratio("weather in Lisbon") < 0.6);
    }

    #[test]
    fn test_ratio_is_bounded() {
        let samples = ["", "a", "aaaa", "abab", "multi\nline", "ünïcödé"];
        for a in samples {
            for b in samples {
                let r = similarity_ratio(a, b);
                assert!((0.0..=1.0).contains(&r), "{a:?} vs {b:?} gave {r}");
            }
        }
    }

    #[test]
    fn test_unicode_compared_by_character() {
        assert_close(similarity_ratio("café", "cafe"), 0.75);
    }
}
