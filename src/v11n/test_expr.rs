//! Rule test predicate grammar.
//!
//! A test is one or more subtests joined by `" & "`; every subtest must
//! hold for the rule to apply. A subtest either probes for presence
//! (`1:2=Exist`, `1:2.1=NotExist`, `3:16=Last`) or compares text lengths
//! (`1:1<1:2`, `2:3*2>2:4`). Operand references are
//! `chapter:verse[.subverse]` with an optional OSIS book prefix
//! (`Gen.1:2`), which the per-book context makes redundant; the prefix is
//! accepted and ignored.

use crate::error::{Error, Result};

use super::context::PlaintextContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Exist,
    NotExist,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Shorter,
    Longer,
}

/// One side of a subtest: a verse (or subverse) position with a length
/// multiplier for comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Operand {
    chapter: u32,
    verse: u32,
    subverse: Option<u32>,
    factor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Subtest {
    Presence { operand: Operand, probe: Probe },
    Compare { left: Operand, right: Operand, op: CompareOp },
}

/// A parsed rule test, ready to evaluate against a book's plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTest {
    subtests: Vec<Subtest>,
}

impl RuleTest {
    /// Parse a test string. Empty or whitespace-only tests always match.
    pub fn parse(test: &str) -> Result<Self> {
        let trimmed = test.trim();
        if trimmed.is_empty() {
            return Ok(Self { subtests: Vec::new() });
        }
        let subtests = trimmed
            .split(" & ")
            .map(|subtest| parse_subtest(subtest.trim(), test))
            .collect::<Result<_>>()?;
        Ok(Self { subtests })
    }

    /// Evaluate against the plaintext context. All subtests must hold; a
    /// rule is skipped entirely when any of them fails.
    pub fn matches(&self, ctx: &PlaintextContext) -> bool {
        self.subtests.iter().all(|subtest| eval(subtest, ctx))
    }
}

/// Parse-and-evaluate convenience for a single test string.
pub fn is_test_matching(test: &str, ctx: &PlaintextContext) -> Result<bool> {
    Ok(RuleTest::parse(test)?.matches(ctx))
}

fn parse_subtest(subtest: &str, full: &str) -> Result<Subtest> {
    let malformed = || Error::InvalidRuleTest(full.to_string());

    if let Some((lhs, rhs)) = subtest.split_once('=') {
        let probe = match rhs.trim() {
            "Exist" => Probe::Exist,
            "NotExist" => Probe::NotExist,
            "Last" => Probe::Last,
            _ => return Err(malformed()),
        };
        let operand = parse_operand(lhs).ok_or_else(malformed)?;
        return Ok(Subtest::Presence { operand, probe });
    }

    let (op, lhs, rhs) = if let Some((lhs, rhs)) = subtest.split_once('<') {
        (CompareOp::Shorter, lhs, rhs)
    } else if let Some((lhs, rhs)) = subtest.split_once('>') {
        (CompareOp::Longer, lhs, rhs)
    } else {
        return Err(malformed());
    };
    let left = parse_operand(lhs).ok_or_else(malformed)?;
    let right = parse_operand(rhs).ok_or_else(malformed)?;
    Ok(Subtest::Compare { left, right, op })
}

fn parse_operand(operand: &str) -> Option<Operand> {
    let (ref_part, factor) = match operand.trim().split_once('*') {
        Some((r, f)) => (r.trim(), f.trim().parse::<u32>().ok()?),
        None => (operand.trim(), 1),
    };
    let (chapter_part, verse_part) = ref_part.split_once(':')?;
    // Book prefixes look like "Gen.1"; chapters are bare numbers.
    let chapter_str = match chapter_part.rsplit_once('.') {
        Some((_, chapter)) => chapter,
        None => chapter_part,
    };
    let chapter = chapter_str.trim().parse::<u32>().ok()?;
    let (verse, subverse) = match verse_part.split_once('.') {
        Some((v, sv)) => (v.trim().parse().ok()?, Some(sv.trim().parse().ok()?)),
        None => (verse_part.trim().parse().ok()?, None),
    };
    Some(Operand {
        chapter,
        verse,
        subverse,
        factor,
    })
}

fn eval(subtest: &Subtest, ctx: &PlaintextContext) -> bool {
    match subtest {
        Subtest::Presence { operand, probe } => {
            let exists = match operand.subverse {
                None => ctx.verse_exists(operand.chapter, operand.verse),
                Some(index) => ctx.subverse_exists(operand.chapter, operand.verse, index),
            };
            match probe {
                Probe::Exist => exists,
                Probe::NotExist => !exists,
                Probe::Last => ctx.is_last_verse(operand.chapter, operand.verse),
            }
        }
        Subtest::Compare { left, right, op } => {
            let lhs = ctx.text_len(left.chapter, left.verse, left.subverse) * left.factor as usize;
            let rhs =
                ctx.text_len(right.chapter, right.verse, right.subverse) * right.factor as usize;
            match op {
                CompareOp::Shorter => lhs < rhs,
                CompareOp::Longer => lhs > rhs,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis_opening() -> PlaintextContext {
        let mut ctx = PlaintextContext::new();
        ctx.add_text(1, 1, None, "in the beginning");
        ctx.add_text(1, 2, None, "let there be light");
        ctx
    }

    #[test]
    fn presence_probes() {
        let ctx = genesis_opening();
        assert!(is_test_matching("Gen.1:2=Exist", &ctx).unwrap());
        assert!(!is_test_matching("Gen.1:3=Exist", &ctx).unwrap());
        assert!(is_test_matching("Gen.1:3=NotExist", &ctx).unwrap());
        assert!(is_test_matching("Gen.1:2=Last", &ctx).unwrap());
        assert!(!is_test_matching("Gen.1:1=Last", &ctx).unwrap());
    }

    #[test]
    fn length_comparisons() {
        let ctx = genesis_opening();
        // "in the beginning" (16) vs "let there be light" (18).
        assert!(is_test_matching("Gen.1:1<1:2", &ctx).unwrap());
        assert!(!is_test_matching("Gen.1:1>1:2", &ctx).unwrap());
        assert!(is_test_matching("1:1*2>1:2", &ctx).unwrap());
    }

    #[test]
    fn conjunction_requires_every_subtest() {
        let ctx = genesis_opening();
        assert!(is_test_matching("1:1=Exist & 1:2=Last", &ctx).unwrap());
        assert!(!is_test_matching("1:1=Exist & 1:3=Exist", &ctx).unwrap());
    }

    #[test]
    fn empty_test_always_matches() {
        let ctx = genesis_opening();
        assert!(is_test_matching("", &ctx).unwrap());
        assert!(is_test_matching("   ", &ctx).unwrap());
    }

    #[test]
    fn subverse_operands() {
        let mut ctx = PlaintextContext::new();
        ctx.add_text(2, 1, Some(0), "title");
        ctx.add_text(2, 1, Some(1), "body");
        assert!(is_test_matching("2:1.0=Exist", &ctx).unwrap());
        assert!(is_test_matching("2:1.1=Exist", &ctx).unwrap());
        assert!(is_test_matching("2:1.2=NotExist", &ctx).unwrap());
    }

    #[test]
    fn malformed_tests_rejected() {
        for test in ["1:1=Sometimes", "nonsense", "1:1<", "x:y=Exist", "1:1 ! 1:2"] {
            assert!(matches!(
                RuleTest::parse(test),
                Err(Error::InvalidRuleTest(_))
            ));
        }
    }
}
