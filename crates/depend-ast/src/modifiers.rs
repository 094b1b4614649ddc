//! Modifier bit set for types, routines and properties

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Modifier bits of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const PUBLIC: Modifiers = Modifiers(0x0001);
    pub const PROTECTED: Modifiers = Modifiers(0x0002);
    pub const PRIVATE: Modifiers = Modifiers(0x0004);
    pub const STATIC: Modifiers = Modifiers(0x0008);
    /// Abstract because of an unimplemented member
    pub const IMPLICIT_ABSTRACT: Modifiers = Modifiers(0x0010);
    /// Declared with the `abstract` keyword
    pub const ABSTRACT: Modifiers = Modifiers(0x0020);
    pub const FINAL: Modifiers = Modifiers(0x0040);

    pub const VISIBILITY: Modifiers = Modifiers(0x0007);
    const ALL: u32 = 0x007f;

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, returning `None` for unknown bits
    pub const fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::ALL == 0 {
            Some(Modifiers(bits))
        } else {
            None
        }
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Modifiers) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_abstract(self) -> bool {
        self.intersects(Self::ABSTRACT | Self::IMPLICIT_ABSTRACT)
    }

    pub fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn visibility(self) -> Modifiers {
        Modifiers(self.0 & Self::VISIBILITY.0)
    }

    /// Replace the visibility bits, keeping abstract/static/final
    pub fn with_visibility(self, visibility: Modifiers) -> Modifiers {
        Modifiers((self.0 & !Self::VISIBILITY.0) | visibility.visibility().0)
    }

    /// Check that the combination can be assigned to an artifact
    pub fn validate(self) -> Result<(), &'static str> {
        if self.is_abstract() && self.is_final() {
            return Err("abstract and final are mutually exclusive");
        }
        if self.visibility().0.count_ones() > 1 {
            return Err("more than one visibility");
        }
        Ok(())
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::PUBLIC, "public"),
            (Self::PROTECTED, "protected"),
            (Self::PRIVATE, "private"),
            (Self::STATIC, "static"),
            (Self::ABSTRACT, "abstract"),
            (Self::FINAL, "final"),
        ];
        let words: Vec<&str> = names
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abstract_final_rejected() {
        assert!((Modifiers::ABSTRACT | Modifiers::FINAL).validate().is_err());
        assert!((Modifiers::IMPLICIT_ABSTRACT | Modifiers::FINAL).validate().is_err());
        assert!(Modifiers::FINAL.validate().is_ok());
    }

    #[test]
    fn test_double_visibility_rejected() {
        assert!((Modifiers::PUBLIC | Modifiers::PRIVATE).validate().is_err());
    }

    #[test]
    fn test_with_visibility_keeps_other_bits() {
        let m = Modifiers::PUBLIC | Modifiers::ABSTRACT;
        assert_eq!(
            m.with_visibility(Modifiers::PROTECTED),
            Modifiers::PROTECTED | Modifiers::ABSTRACT
        );

        let s = Modifiers::PRIVATE | Modifiers::STATIC;
        assert_eq!(
            s.with_visibility(Modifiers::PUBLIC),
            Modifiers::PUBLIC | Modifiers::STATIC
        );
    }

    #[test]
    fn test_from_bits_rejects_unknown() {
        assert!(Modifiers::from_bits(0x1000).is_none());
        assert_eq!(Modifiers::from_bits(0x40), Some(Modifiers::FINAL));
    }
}
