//! Versification: mapping edition-specific verse numbering onto the
//! canonical scheme.
//!
//! Editions disagree about verse boundaries for historical and manuscript
//! reasons. A rule table keyed by version-numbered source reference records
//! how each disputed position maps onto the canonical numbering; rules
//! carry textual test predicates so a single table can serve editions whose
//! layouts differ. The rule table is immutable reference data: loaded once,
//! read-only at normalization time.

mod context;
mod normalize;
mod test_expr;

pub use context::PlaintextContext;
pub use normalize::{InputPhrase, Normalized, Normalizer, Placeholder, StoredPhrase, import_book};
pub use test_expr::{RuleTest, is_test_matching};

use std::collections::HashMap;

use crate::reference::Reference;

/// What a rule does to its source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAction {
    /// Numbering already canonical; record the rule family and move on.
    Keep,
    /// The position maps to the rule's standard reference.
    Renumber,
    /// The canonical slot's text was merged into an earlier verse; a
    /// placeholder links back to the start of the merge range.
    MergedAbove,
    /// The canonical slot has no text in this edition at all.
    Empty,
}

impl RuleAction {
    /// Numeric code used by persisted rule tables.
    pub fn code(self) -> u8 {
        match self {
            RuleAction::Keep => 1,
            RuleAction::Renumber => 2,
            RuleAction::MergedAbove => 3,
            RuleAction::Empty => 4,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RuleAction::Keep),
            2 => Some(RuleAction::Renumber),
            3 => Some(RuleAction::MergedAbove),
            4 => Some(RuleAction::Empty),
            _ => None,
        }
    }
}

/// One versification rule.
#[derive(Debug, Clone)]
pub struct V11nRule {
    pub id: u32,
    /// Version-numbered position the rule applies to.
    pub source: Reference,
    /// Canonical position the rule maps to.
    pub standard: Reference,
    pub action: RuleAction,
    /// Test predicate; see [`RuleTest`]. Empty means unconditional.
    pub test: String,
    /// Rule family recorded on affected phrases.
    pub source_type: u32,
}

/// Ordered rule lookup by source reference.
pub trait RuleRepository {
    /// All rules whose source matches exactly, ordered by rule id. The id
    /// order is the tie-break between rules whose tests could both match.
    fn rules_for_source(&self, source: &Reference) -> Vec<&V11nRule>;
}

/// Rule table held in memory. Persistent backends implement
/// [`RuleRepository`] at the collaborator layer.
#[derive(Debug, Default)]
pub struct InMemoryRules {
    by_source: HashMap<(u8, u32, u32, u32), Vec<V11nRule>>,
}

fn source_key(reference: &Reference) -> (u8, u32, u32, u32) {
    (
        reference.book.as_u8(),
        reference.chapter.unwrap_or(0),
        reference.verse.unwrap_or(0),
        reference.subverse.unwrap_or(0),
    )
}

impl InMemoryRules {
    pub fn new(rules: Vec<V11nRule>) -> Self {
        let mut by_source: HashMap<_, Vec<V11nRule>> = HashMap::new();
        for rule in rules {
            by_source.entry(source_key(&rule.source)).or_default().push(rule);
        }
        for bucket in by_source.values_mut() {
            bucket.sort_by_key(|rule| rule.id);
        }
        Self { by_source }
    }
}

impl RuleRepository for InMemoryRules {
    fn rules_for_source(&self, source: &Reference) -> Vec<&V11nRule> {
        self.by_source
            .get(&source_key(source))
            .map(|bucket| bucket.iter().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookTable;

    #[test]
    fn action_codes_round_trip() {
        for action in [
            RuleAction::Keep,
            RuleAction::Renumber,
            RuleAction::MergedAbove,
            RuleAction::Empty,
        ] {
            assert_eq!(RuleAction::from_code(action.code()), Some(action));
        }
        assert_eq!(RuleAction::from_code(0), None);
        assert_eq!(RuleAction::from_code(5), None);
    }

    #[test]
    fn rules_returned_in_id_order() {
        let genesis = BookTable::id_for("Gen").unwrap();
        let source = Reference::new(genesis, 3, 5);
        let rule = |id| V11nRule {
            id,
            source,
            standard: source,
            action: RuleAction::Keep,
            test: String::new(),
            source_type: 0,
        };
        let repo = InMemoryRules::new(vec![rule(12), rule(3), rule(7)]);
        let ids: Vec<u32> = repo.rules_for_source(&source).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 7, 12]);
        assert!(repo.rules_for_source(&Reference::new(genesis, 3, 6)).is_empty());
    }
}
