//! Generic book identifiers and the OSIS code table.
//!
//! Books carry a compact integer id that is stable across every
//! versification scheme: 1-66 are the canonical books, 67-69 are reserved,
//! and 70-87 hold the apocrypha. The table is loaded once per process and
//! provides both lookup directions; `id_for` and `code_for` round-trip
//! exactly.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Generic book id, valid across all versification schemes.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(transparent)]
pub struct BookId(u8);

impl BookId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 87;

    /// Construct from a raw id, rejecting ids outside 1-87 and the
    /// reserved 67-69 gap.
    pub fn new(id: u8) -> Result<Self> {
        if id < Self::MIN || id > Self::MAX || (67..=69).contains(&id) {
            return Err(Error::InvalidBookId(id as u64));
        }
        Ok(Self(id))
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match BookTable::code_for(*self) {
            Ok(code) => f.write_str(code),
            Err(_) => write!(f, "Book{}", self.0),
        }
    }
}

/// (id, OSIS code) pairs: the 66 canonical books, then the apocrypha at
/// 70-87.
const BOOKS: &[(u8, &str)] = &[
    (1, "Gen"),
    (2, "Exod"),
    (3, "Lev"),
    (4, "Num"),
    (5, "Deut"),
    (6, "Josh"),
    (7, "Judg"),
    (8, "Ruth"),
    (9, "1Sam"),
    (10, "2Sam"),
    (11, "1Kgs"),
    (12, "2Kgs"),
    (13, "1Chr"),
    (14, "2Chr"),
    (15, "Ezra"),
    (16, "Neh"),
    (17, "Esth"),
    (18, "Job"),
    (19, "Ps"),
    (20, "Prov"),
    (21, "Eccl"),
    (22, "Song"),
    (23, "Isa"),
    (24, "Jer"),
    (25, "Lam"),
    (26, "Ezek"),
    (27, "Dan"),
    (28, "Hos"),
    (29, "Joel"),
    (30, "Amos"),
    (31, "Obad"),
    (32, "Jonah"),
    (33, "Mic"),
    (34, "Nah"),
    (35, "Hab"),
    (36, "Zeph"),
    (37, "Hag"),
    (38, "Zech"),
    (39, "Mal"),
    (40, "Matt"),
    (41, "Mark"),
    (42, "Luke"),
    (43, "John"),
    (44, "Acts"),
    (45, "Rom"),
    (46, "1Cor"),
    (47, "2Cor"),
    (48, "Gal"),
    (49, "Eph"),
    (50, "Phil"),
    (51, "Col"),
    (52, "1Thess"),
    (53, "2Thess"),
    (54, "1Tim"),
    (55, "2Tim"),
    (56, "Titus"),
    (57, "Phlm"),
    (58, "Heb"),
    (59, "Jas"),
    (60, "1Pet"),
    (61, "2Pet"),
    (62, "1John"),
    (63, "2John"),
    (64, "3John"),
    (65, "Jude"),
    (66, "Rev"),
    (70, "Tob"),
    (71, "Jdt"),
    (72, "AddEsth"),
    (73, "Wis"),
    (74, "Sir"),
    (75, "Bar"),
    (76, "EpJer"),
    (77, "PrAzar"),
    (78, "Sus"),
    (79, "Bel"),
    (80, "1Macc"),
    (81, "2Macc"),
    (82, "3Macc"),
    (83, "4Macc"),
    (84, "PrMan"),
    (85, "1Esd"),
    (86, "2Esd"),
    (87, "AddPs"),
];

/// Bidirectional lookup between OSIS codes and generic book ids.
pub struct BookTable;

impl BookTable {
    fn index() -> &'static HashMap<&'static str, BookId> {
        static INDEX: OnceLock<HashMap<&'static str, BookId>> = OnceLock::new();
        INDEX.get_or_init(|| {
            BOOKS
                .iter()
                .map(|&(id, code)| (code, BookId(id)))
                .collect()
        })
    }

    /// Resolve an OSIS code to its generic book id.
    pub fn id_for(osis: &str) -> Result<BookId> {
        Self::index()
            .get(osis)
            .copied()
            .ok_or_else(|| Error::UnknownBook(osis.to_string()))
    }

    /// Resolve a generic book id back to its OSIS code.
    pub fn code_for(id: BookId) -> Result<&'static str> {
        BOOKS
            .iter()
            .find(|&&(n, _)| n == id.0)
            .map(|&(_, code)| code)
            .ok_or(Error::InvalidBookId(id.0 as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_round_trips() {
        for &(id, code) in BOOKS {
            let book = BookTable::id_for(code).unwrap();
            assert_eq!(book.as_u8(), id);
            assert_eq!(BookTable::code_for(book).unwrap(), code);
        }
    }

    #[test]
    fn table_covers_canon_and_apocrypha() {
        assert_eq!(BOOKS.len(), 84);
        assert_eq!(BookTable::id_for("Gen").unwrap().as_u8(), 1);
        assert_eq!(BookTable::id_for("Rev").unwrap().as_u8(), 66);
        assert_eq!(BookTable::id_for("Tob").unwrap().as_u8(), 70);
        assert_eq!(BookTable::id_for("AddPs").unwrap().as_u8(), 87);
    }

    #[test]
    fn unknown_code_rejected() {
        assert!(matches!(
            BookTable::id_for("Genesis"),
            Err(Error::UnknownBook(_))
        ));
    }

    #[test]
    fn reserved_gap_rejected() {
        for id in [0, 67, 68, 69, 88, 200] {
            assert!(matches!(BookId::new(id), Err(Error::InvalidBookId(_))));
        }
        assert!(BookId::new(66).is_ok());
        assert!(BookId::new(70).is_ok());
    }

    #[test]
    fn display_uses_osis_code() {
        let ps = BookTable::id_for("Ps").unwrap();
        assert_eq!(ps.to_string(), "Ps");
    }
}
