use std::collections::BTreeMap;

/// Weights the search engine assigns to each kind of match
///
/// The defaults are the search client's built-in values. Override fields to
/// experiment with ranking without touching the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorer {
    /// Object full name, or its last segment, equals the query term
    pub obj_name_match: i32,
    /// Query term occurs inside the object's last name segment
    pub obj_partial_match: i32,
    /// Extra score by object priority; priorities not listed use `obj_prio_default`
    pub obj_prio: BTreeMap<i32, i32>,
    pub obj_prio_default: i32,
    /// Term found in a page or section title
    pub title: i32,
    pub partial_title: i32,
    /// Term found in body text
    pub term: i32,
    pub partial_term: i32,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            obj_name_match: 11,
            obj_partial_match: 6,
            obj_prio: BTreeMap::from([(0, 15), (1, 5), (2, -5)]),
            obj_prio_default: 0,
            title: 15,
            partial_title: 7,
            term: 5,
            partial_term: 2,
        }
    }
}

impl Scorer {
    pub fn priority_score(&self, priority: i32) -> i32 {
        self.obj_prio.get(&priority).copied().unwrap_or(self.obj_prio_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let scorer = Scorer::default();
        assert_eq!(scorer.obj_name_match, 11);
        assert_eq!(scorer.obj_partial_match, 6);
        assert_eq!(scorer.title, 15);
        assert_eq!(scorer.partial_title, 7);
        assert_eq!(scorer.term, 5);
        assert_eq!(scorer.partial_term, 2);
    }

    #[test]
    fn test_priority_score() {
        let scorer = Scorer::default();
        assert_eq!(scorer.priority_score(0), 15);
        assert_eq!(scorer.priority_score(1), 5);
        assert_eq!(scorer.priority_score(2), -5);
        assert_eq!(scorer.priority_score(-1), 0);
        assert_eq!(scorer.priority_score(7), 0);
    }
}
