//! English Porter stemmer, matching the one the documentation generator uses
//! for both indexing and client-side querying.
//!
//! Consonant/vowel classes follow the generator's definition:
//! - a consonant run starts with any character outside `aeiou` and continues with
//!   characters outside `aeiouy`
//! - a vowel run starts with one of `aeiouy` and continues with `aeiou`
//!
//! Underscores and digits count as consonants, so identifiers like
//! `graph_runner` stem to `graph_runn`.

const STEP2_SUFFIXES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

const STEP3_SUFFIXES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ou", "ism",
    "ate", "iti", "ous", "ive", "ize",
];

fn is_strict_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn is_vowel_or_y(c: char) -> bool {
    is_strict_vowel(c) || c == 'y'
}

/// Number of vowel-run/consonant-run pairs in `s`
fn measure(s: &[char]) -> usize {
    let mut i = 0;
    let n = s.len();

    // Optional leading consonant run
    if i < n && !is_strict_vowel(s[i]) {
        i += 1;
        while i < n && !is_vowel_or_y(s[i]) {
            i += 1;
        }
    }

    let mut m = 0;
    while i < n {
        // Vowel run
        i += 1;
        while i < n && is_strict_vowel(s[i]) {
            i += 1;
        }
        if i >= n {
            break;
        }
        // Consonant run
        i += 1;
        while i < n && !is_vowel_or_y(s[i]) {
            i += 1;
        }
        m += 1;
    }
    m
}

/// Whether `s` contains a vowel run at all
fn has_vowel(s: &[char]) -> bool {
    let mut i = 0;
    if i < s.len() && !is_strict_vowel(s[i]) {
        i += 1;
        while i < s.len() && !is_vowel_or_y(s[i]) {
            i += 1;
        }
    }
    i < s.len()
}

/// Consonant run, single vowel, final consonant other than w/x/y (e.g. `hop`, `fil`)
fn is_short_cvc(s: &[char]) -> bool {
    let n = s.len();
    if n < 3 {
        return false;
    }
    !is_strict_vowel(s[0])
        && s[1..n - 2].iter().all(|&c| !is_vowel_or_y(c))
        && is_vowel_or_y(s[n - 2])
        && !matches!(s[n - 1], 'a' | 'e' | 'i' | 'o' | 'u' | 'w' | 'x' | 'y')
}

fn ends_with(w: &[char], suffix: &str) -> bool {
    let suffix: Vec<char> = suffix.chars().collect();
    w.len() >= suffix.len() && w[w.len() - suffix.len()..] == suffix[..]
}

/// Longest listed suffix that leaves a non-empty stem
fn longest_suffix<'a>(w: &[char], suffixes: &[&'a str]) -> Option<&'a str> {
    suffixes
        .iter()
        .copied()
        .filter(|suffix| w.len() > suffix.chars().count() && ends_with(w, suffix))
        .max_by_key(|suffix| suffix.len())
}

fn replace_suffix(w: &mut Vec<char>, strip: usize, with: &str) {
    w.truncate(w.len() - strip);
    w.extend(with.chars());
}

fn step1a(w: &mut Vec<char>) {
    if (ends_with(w, "sses") && w.len() > 4) || (ends_with(w, "ies") && w.len() > 3) {
        w.truncate(w.len() - 2);
    } else if w.len() >= 3 && ends_with(w, "s") && w[w.len() - 2] != 's' {
        w.pop();
    }
}

fn step1b(w: &mut Vec<char>) {
    if ends_with(w, "eed") && w.len() > 3 {
        if measure(&w[..w.len() - 3]) > 0 {
            w.pop();
        }
        return;
    }

    let strip = if ends_with(w, "ing") && w.len() > 3 {
        3
    } else if ends_with(w, "ed") && w.len() > 2 {
        2
    } else {
        return;
    };

    let stem_len = w.len() - strip;
    if !has_vowel(&w[..stem_len]) {
        return;
    }
    w.truncate(stem_len);

    let n = w.len();
    if ends_with(w, "at") || ends_with(w, "bl") || ends_with(w, "iz") {
        w.push('e');
    } else if n >= 2
        && w[n - 1] == w[n - 2]
        && !matches!(w[n - 1], 'a' | 'e' | 'i' | 'o' | 'u' | 'y' | 'l' | 's' | 'z')
    {
        w.pop();
    } else if is_short_cvc(w) {
        w.push('e');
    }
}

fn step1c(w: &mut [char]) {
    let n = w.len();
    if n > 1 && w[n - 1] == 'y' && has_vowel(&w[..n - 1]) {
        w[n - 1] = 'i';
    }
}

fn replace_mapped(w: &mut Vec<char>, table: &[(&str, &str)]) {
    let suffixes: Vec<&str> = table.iter().map(|(from, _)| *from).collect();
    let Some(suffix) = longest_suffix(w, &suffixes) else {
        return;
    };
    let strip = suffix.chars().count();
    if measure(&w[..w.len() - strip]) > 0 {
        let replacement = table.iter().find(|(from, _)| *from == suffix).map(|(_, to)| *to);
        replace_suffix(w, strip, replacement.unwrap_or(""));
    }
}

fn step4(w: &mut Vec<char>) {
    if let Some(suffix) = longest_suffix(w, STEP4_SUFFIXES) {
        let stem_len = w.len() - suffix.chars().count();
        if measure(&w[..stem_len]) > 1 {
            w.truncate(stem_len);
        }
    } else if w.len() > 4 && (ends_with(w, "sion") || ends_with(w, "tion")) {
        let stem_len = w.len() - 3;
        if measure(&w[..stem_len]) > 1 {
            w.truncate(stem_len);
        }
    }
}

fn step5(w: &mut Vec<char>) {
    let n = w.len();
    if n > 1 && w[n - 1] == 'e' {
        let stem = &w[..n - 1];
        let m = measure(stem);
        if m > 1 || (m == 1 && !is_short_cvc(stem)) {
            w.pop();
        }
    }
    if ends_with(w, "ll") && measure(w) > 1 {
        w.pop();
    }
}

/// Reduce a lowercase word to its Porter stem
///
/// Words shorter than three characters are returned unchanged.
///
/// # Examples
///
/// ```
/// use search_index_explorer::query::stem;
///
/// assert_eq!(stem("experiments"), "experi");
/// assert_eq!(stem("analysis"), "analysi");
/// assert_eq!(stem("graph_runner"), "graph_runn");
/// ```
pub fn stem(word: &str) -> String {
    let mut w: Vec<char> = word.chars().collect();
    if w.len() < 3 {
        return word.to_string();
    }

    // A leading y is always a consonant
    let leading_y = w[0] == 'y';
    if leading_y {
        w[0] = 'Y';
    }

    step1a(&mut w);
    step1b(&mut w);
    step1c(&mut w);
    replace_mapped(&mut w, STEP2_SUFFIXES);
    replace_mapped(&mut w, STEP3_SUFFIXES);
    step4(&mut w);
    step5(&mut w);

    if leading_y {
        w[0] = 'y';
    }
    w.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure(&chars("tr")), 0);
        assert_eq!(measure(&chars("ee")), 0);
        assert_eq!(measure(&chars("tree")), 0);
        assert_eq!(measure(&chars("trouble")), 1);
        assert_eq!(measure(&chars("oats")), 1);
        assert_eq!(measure(&chars("troubles")), 2);
        assert_eq!(measure(&chars("private")), 2);
    }

    #[test]
    fn test_short_words_untouched() {
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("a"), "a");
        assert_eq!(stem(""), "");
    }

    #[test]
    fn test_step1_plurals_and_participles() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("feed"), "feed");
        assert_eq!(stem("agreed"), "agre");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("sing"), "sing");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("falling"), "fall");
        assert_eq!(stem("filing"), "file");
        assert_eq!(stem("sized"), "size");
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
    }

    #[test]
    fn test_derivational_suffixes() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("conditional"), "condit");
        assert_eq!(stem("generalization"), "gener");
        assert_eq!(stem("hopeful"), "hope");
        assert_eq!(stem("goodness"), "good");
        assert_eq!(stem("adjustment"), "adjust");
        assert_eq!(stem("probate"), "probat");
        assert_eq!(stem("rate"), "rate");
        assert_eq!(stem("controll"), "control");
        assert_eq!(stem("roll"), "roll");
    }

    #[test]
    fn test_terms_seen_in_generated_indexes() {
        assert_eq!(stem("experiment"), "experi");
        assert_eq!(stem("activities"), "activ");
        assert_eq!(stem("durations"), "durat");
        assert_eq!(stem("visualize"), "visual");
        assert_eq!(stem("parser"), "parser");
        assert_eq!(stem("langgraph_log_parser"), "langgraph_log_pars");
        assert_eq!(stem("graph_runner"), "graph_runn");
        assert_eq!(stem("database"), "databas");
        assert_eq!(stem("directory"), "directori");
        assert_eq!(stem("structure"), "structur");
        assert_eq!(stem("exporting"), "export");
    }

    #[test]
    fn test_leading_y_is_consonant() {
        assert_eq!(stem("yelling"), "yell");
        assert_eq!(stem("youth"), "youth");
    }
}
