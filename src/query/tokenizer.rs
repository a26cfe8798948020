//! Word splitting and stopwords shared by indexing and querying.

/// English stopwords the generator leaves out of both the index and queries
pub const STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it", "near",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Letters, digits and underscore make up a word
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split text into maximal runs of word characters
///
/// `langgraph_log_parser.analyze` yields `langgraph_log_parser` and `analyze`;
/// punctuation and whitespace never survive.
pub fn split_query(text: &str) -> Vec<&str> {
    text.split(|c: char| !is_word_char(c)).filter(|piece| !piece.is_empty()).collect()
}

/// True for words the client never searches for (all ASCII digits)
pub fn is_numeric(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}
