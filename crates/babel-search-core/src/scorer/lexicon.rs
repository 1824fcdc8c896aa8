//! Common-word lexicon for the language-density metric.

/// Curated common English words: articles, pronouns, prepositions,
/// auxiliaries, and high-frequency verbs. Sorted for binary search.
pub(crate) const COMMON_WORDS: [&str; 112] = [
    "a", "about", "after", "again", "all", "also", "an", "and", "any",
    "are", "as", "at", "back", "be", "because", "been", "but", "by",
    "can", "come", "could", "day", "did", "do", "even", "first", "for",
    "from", "get", "give", "go", "good", "had", "has", "have", "he",
    "her", "him", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "just", "know", "like", "look", "make", "may", "me",
    "most", "my", "new", "no", "not", "now", "of", "on", "one",
    "only", "or", "other", "our", "out", "over", "part", "people", "said",
    "say", "see", "she", "so", "some", "take", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "think", "this", "time",
    "to", "two", "up", "us", "use", "want", "was", "way", "we",
    "well", "were", "what", "when", "which", "who", "will", "with", "work",
    "would", "year", "you", "your",
];

/// Membership test against [`COMMON_WORDS`].
#[inline]
pub(crate) fn is_common_word(word: &str) -> bool {
    COMMON_WORDS.binary_search(&word).is_ok()
}
