use itertools::Itertools;

/// How sentences are separated inside a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentenceSpacing {
    #[default]
    Single,
    /// Two spaces after `.`, `!` or `?`
    Double,
}

impl SentenceSpacing {
    fn separator_after(self, word: &str) -> &'static str {
        match self {
            SentenceSpacing::Double if ends_sentence(word) => "  ",
            _ => " ",
        }
    }
}

fn ends_sentence(word: &str) -> bool {
    word.ends_with(&['.', '!', '?'][..])
}

/// Character budget for one paragraph given a viewport estimate.
pub fn capacity_hint(chars_per_line: usize, lines: usize) -> usize {
    chars_per_line.saturating_mul(lines).max(1)
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

/// Splits practice text into paragraphs of at most `capacity` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    capacity: usize,
    spacing: SentenceSpacing,
}

impl Segmenter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            spacing: SentenceSpacing::Single,
        }
    }

    pub fn with_spacing(mut self, spacing: SentenceSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Always returns at least one paragraph. Breaks only between words; a word
    /// longer than the budget becomes a paragraph of its own.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;
        let mut separator = "";

        for word in text.split_whitespace() {
            let word_len = word.chars().count();

            if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + separator.len() + word_len <= self.capacity {
                current.push_str(separator);
                current.push_str(word);
                current_len += separator.len() + word_len;
            } else {
                paragraphs.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }

            separator = self.spacing.separator_after(word);
        }

        if !current.is_empty() || paragraphs.is_empty() {
            paragraphs.push(current);
        }

        paragraphs
    }
}

/// Shorthand for single-spaced segmentation.
pub fn segment(text: &str, capacity: usize) -> Vec<String> {
    Segmenter::new(capacity).segment(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_of(paragraphs: &[String]) -> Vec<String> {
        normalize_whitespace(&paragraphs.join(" "))
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_short_text_is_one_paragraph() {
        assert_eq!(segment("hello world", 80), vec!["hello world"]);
    }

    #[test]
    fn test_whitespace_is_normalized() {
        assert_eq!(
            segment("  hello \n\t world  ", 80),
            vec!["hello world".to_string()]
        );
    }

    #[test]
    fn test_splits_at_word_boundaries() {
        let paragraphs = segment("aaa bbb ccc ddd", 7);
        assert_eq!(paragraphs, vec!["aaa bbb", "ccc ddd"]);
        assert!(paragraphs.iter().all(|p| p.chars().count() <= 7));
    }

    #[test]
    fn test_long_word_gets_its_own_paragraph() {
        let paragraphs = segment("a supercalifragilistic b", 5);
        assert_eq!(paragraphs, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_empty_text_yields_one_empty_paragraph() {
        assert_eq!(segment("", 10), vec![String::new()]);
        assert_eq!(segment("   \n ", 10), vec![String::new()]);
    }

    #[test]
    fn test_zero_capacity_is_treated_as_one() {
        assert_eq!(Segmenter::new(0).capacity(), 1);
        assert_eq!(segment("ab cd", 0), vec!["ab", "cd"]);
    }

    #[test]
    fn test_capacity_counts_chars_not_bytes() {
        // each word is 3 chars but 6 bytes
        let paragraphs = segment("äöü äöü", 7);
        assert_eq!(paragraphs, vec!["äöü äöü"]);
    }

    #[test]
    fn test_segmentation_preserves_word_sequence() {
        let text = "The five boxing wizards jump quickly. How vexingly quick daft zebras jump! \
                    Pack my box with five dozen liquor jugs.";
        let expected: Vec<String> = text.split_whitespace().map(str::to_string).collect();

        for capacity in 1..120 {
            let paragraphs = segment(text, capacity);
            assert_eq!(words_of(&paragraphs), expected, "capacity {capacity}");
            for p in &paragraphs {
                let len = p.chars().count();
                assert!(
                    len <= capacity || !p.contains(' '),
                    "paragraph {p:?} exceeds {capacity}"
                );
            }
        }
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let text = "she sells sea shells by the sea shore";
        assert_eq!(segment(text, 12), segment(text, 12));
    }

    #[test]
    fn test_double_spacing_after_sentences() {
        let segmenter = Segmenter::new(80).with_spacing(SentenceSpacing::Double);
        assert_eq!(
            segmenter.segment("One. Two! Three? four"),
            vec!["One.  Two!  Three?  four"]
        );
    }

    #[test]
    fn test_double_spacing_counts_against_capacity() {
        let segmenter = Segmenter::new(8).with_spacing(SentenceSpacing::Double);
        // "Hi. you" is 7 chars single spaced but 8 with the extra space
        assert_eq!(segmenter.segment("Hi. you"), vec!["Hi.  you"]);
        let segmenter = Segmenter::new(7).with_spacing(SentenceSpacing::Double);
        assert_eq!(segmenter.segment("Hi. you"), vec!["Hi.", "you"]);
    }

    #[test]
    fn test_double_spacing_preserves_word_sequence() {
        let text = "a. b c! d? e";
        let segmenter = Segmenter::new(4).with_spacing(SentenceSpacing::Double);
        assert_eq!(words_of(&segmenter.segment(text)), vec!["a.", "b", "c!", "d?", "e"]);
    }

    #[test]
    fn test_capacity_hint() {
        assert_eq!(capacity_hint(70, 3), 210);
        assert_eq!(capacity_hint(0, 3), 1);
        assert_eq!(capacity_hint(usize::MAX, 2), usize::MAX);
    }
}
