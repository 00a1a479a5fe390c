//! Joinpoint kind flags: one category bit combined with one aspect bit.

use bitflags::bitflags;

bitflags! {
    /// Bit-flag classification of a joinpoint.
    ///
    /// A well-formed kind combines exactly one *category* bit (low half) with
    /// exactly one *aspect* bit (high half), with one exception: accessor
    /// declarations additionally carry [`JoinpointKind::BODY`] alongside their
    /// get/set/add/remove aspect, since the accessor body is the location the
    /// weaver rewrites.
    ///
    /// Matching is a subset test, see [`JoinpointKind::matches`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct JoinpointKind: u32 {
        /// Module-level entity.
        const ASSEMBLY = 1 << 0;
        /// Class declaration.
        const CLASS = 1 << 1;
        /// Interface declaration.
        const INTERFACE = 1 << 2;
        /// Enum declaration.
        const ENUM = 1 << 3;
        /// Struct (value type) declaration.
        const STRUCT = 1 << 4;
        /// Plain field.
        const FIELD = 1 << 5;
        /// Property.
        const PROPERTY = 1 << 6;
        /// Plain method or operator.
        const METHOD = 1 << 7;
        /// Instance or static constructor.
        const CONSTRUCTOR = 1 << 8;
        /// Event.
        const EVENT = 1 << 9;
        /// Delegate type.
        const TYPE_DELEGATE = 1 << 10;
        /// Delegate-typed field.
        const FIELD_DELEGATE = 1 << 11;
        /// Exception occurrence.
        const EXCEPTION = 1 << 12;

        /// Declaration aspect.
        const DECLARATION = 1 << 16;
        /// Method body aspect.
        const BODY = 1 << 17;
        /// Property read aspect.
        const GET = 1 << 18;
        /// Property write aspect.
        const SET = 1 << 19;
        /// Invocation aspect.
        const CALL = 1 << 20;
        /// Throw aspect.
        const THROW = 1 << 21;
        /// Subscribe / combine aspect.
        const ADD = 1 << 22;
        /// Unsubscribe / separate aspect.
        const REMOVE = 1 << 23;
    }
}

impl JoinpointKind {
    /// All category bits.
    pub const CATEGORY_MASK: JoinpointKind = JoinpointKind::ASSEMBLY
        .union(JoinpointKind::CLASS)
        .union(JoinpointKind::INTERFACE)
        .union(JoinpointKind::ENUM)
        .union(JoinpointKind::STRUCT)
        .union(JoinpointKind::FIELD)
        .union(JoinpointKind::PROPERTY)
        .union(JoinpointKind::METHOD)
        .union(JoinpointKind::CONSTRUCTOR)
        .union(JoinpointKind::EVENT)
        .union(JoinpointKind::TYPE_DELEGATE)
        .union(JoinpointKind::FIELD_DELEGATE)
        .union(JoinpointKind::EXCEPTION);

    /// All aspect bits.
    pub const ASPECT_MASK: JoinpointKind = JoinpointKind::DECLARATION
        .union(JoinpointKind::BODY)
        .union(JoinpointKind::GET)
        .union(JoinpointKind::SET)
        .union(JoinpointKind::CALL)
        .union(JoinpointKind::THROW)
        .union(JoinpointKind::ADD)
        .union(JoinpointKind::REMOVE);

    /// The category bits of this kind.
    #[must_use]
    pub fn category(self) -> JoinpointKind {
        self & Self::CATEGORY_MASK
    }

    /// The aspect bits of this kind.
    #[must_use]
    pub fn aspect(self) -> JoinpointKind {
        self & Self::ASPECT_MASK
    }

    /// Subset match: `true` iff *all* bits of `mask` are present in `self`.
    ///
    /// This is deliberately not an overlap test. A query mask of
    /// `PROPERTY | SET` must not match a `PROPERTY | GET | BODY` entry even
    /// though the category bit overlaps.
    #[must_use]
    pub fn matches(self, mask: JoinpointKind) -> bool {
        self.contains(mask)
    }

    /// Whether this kind tags a declaration-level entity (declaration or body
    /// aspect) rather than an instruction-level occurrence.
    #[must_use]
    pub fn is_declaration_level(self) -> bool {
        self.intersects(JoinpointKind::DECLARATION | JoinpointKind::BODY)
    }
}

#[cfg(test)]
mod tests {
    use super::JoinpointKind;

    #[test]
    fn test_subset_match_requires_all_bits() {
        let entry = JoinpointKind::PROPERTY | JoinpointKind::GET | JoinpointKind::BODY;
        assert!(entry.matches(JoinpointKind::PROPERTY));
        assert!(entry.matches(JoinpointKind::PROPERTY | JoinpointKind::GET));
        assert!(entry.matches(JoinpointKind::empty()));

        // Overlap without subset must not match.
        assert!(!entry.matches(JoinpointKind::PROPERTY | JoinpointKind::SET));
        assert!(!entry.matches(JoinpointKind::METHOD));
    }

    #[test]
    fn test_category_aspect_split() {
        let kind = JoinpointKind::CONSTRUCTOR | JoinpointKind::CALL;
        assert_eq!(kind.category(), JoinpointKind::CONSTRUCTOR);
        assert_eq!(kind.aspect(), JoinpointKind::CALL);
        assert!(!kind.is_declaration_level());
        assert!((JoinpointKind::METHOD | JoinpointKind::BODY).is_declaration_level());
    }
}
