//  BUILTINS.rs
//    by Lut99
//
//  Created:
//    05 Mar 2025, 15:10:36
//  Last edited:
//    11 Jul 2025, 16:44:09
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the builtin types shared by every language driver: the
//!   unit-, never-, boolean- and string types plus the fixed-width digit
//!   family. They are installed once into the root scope, which every
//!   compilation unit's scope chains to as its ultimate parent.
//

use lazy_static::lazy_static;
use specifications::text::Location;

use crate::decl::{Attributes, DeclId, DigitWidth, Sign};
use crate::scope::{BASE_TAGS, ScopeId, ScopeTag};
use crate::tree::Tree;


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use specifications::diagnostics::Reporter;

    use super::*;
    use crate::decl::DeclTag;


    #[test]
    fn test_install_binds_every_builtin() {
        let mut tree = Tree::new(Rc::new(Reporter::new()));
        let (root, builtins): (ScopeId, Builtins) = Builtins::install(&mut tree);

        assert_eq!(tree.scope_get(root, ScopeTag::Types, "bool"), Some(builtins.boolean));
        assert_eq!(tree.scope_get(root, ScopeTag::Types, "str"), Some(builtins.string));
        assert_eq!(tree.scope_get(root, ScopeTag::Types, "unit"), Some(builtins.unit));
        assert_eq!(tree.scope_get(root, ScopeTag::Types, "never"), Some(builtins.never));
        assert_eq!(tree.scope_get(root, ScopeTag::Types, "uint16"), Some(builtins.digit(DigitWidth::W16, Sign::Unsigned)));
        assert!(tree.reporter().is_empty());

        // Every digit is distinct and closed
        for (name, width, sign) in DIGITS.iter() {
            let decl: DeclId = builtins.digit(*width, *sign);
            assert_eq!(tree.tag_of(decl), DeclTag::Digit);
            assert!(!tree.is_open(decl));
            assert_eq!(tree.name_of(decl), *name);
        }
    }
}





/***** CONSTANTS *****/
lazy_static! {
    /// The description of the builtin digit family: one `(name, width, sign)` row per type.
    static ref DIGITS: Vec<(&'static str, DigitWidth, Sign)> = vec![
        ("int8", DigitWidth::W8, Sign::Signed),
        ("int16", DigitWidth::W16, Sign::Signed),
        ("int32", DigitWidth::W32, Sign::Signed),
        ("int64", DigitWidth::W64, Sign::Signed),
        ("uint8", DigitWidth::W8, Sign::Unsigned),
        ("uint16", DigitWidth::W16, Sign::Unsigned),
        ("uint32", DigitWidth::W32, Sign::Unsigned),
        ("uint64", DigitWidth::W64, Sign::Unsigned),
    ];
}





/***** LIBRARY *****/
/// The handles to the shared builtin types.
///
/// Drivers receive these through the session so they never have to look the builtins up by name
/// (although the name route through the root scope works too).
#[derive(Clone, Debug)]
pub struct Builtins {
    /// The type with exactly one value.
    pub unit:    DeclId,
    /// The type with no values at all.
    pub never:   DeclId,
    /// The boolean type.
    pub boolean: DeclId,
    /// The string type.
    pub string:  DeclId,
    /// The digit family, indexed by width and signedness.
    digits: Vec<DeclId>,
}
impl Builtins {
    /// Installs the builtin types into a freshly created root scope.
    ///
    /// # Arguments
    /// - `tree`: The [`Tree`] to create the root scope and the builtin declarations in.
    ///
    /// # Returns
    /// A pair of the root scope (which every compilation unit's scope should chain to as its
    /// ultimate parent) and the Builtins handles.
    pub fn install(tree: &mut Tree) -> (ScopeId, Self) {
        let root: ScopeId = tree.new_scope(None, BASE_TAGS);

        let unit: DeclId = tree.type_unit(Location::builtin(), "unit");
        let never: DeclId = tree.type_never(Location::builtin(), "never");
        let boolean: DeclId = tree.type_bool(Location::builtin(), "bool");
        let string: DeclId = tree.type_str(Location::builtin(), "str");
        let mut digits: Vec<DeclId> = Vec::with_capacity(DIGITS.len());
        for (name, width, sign) in DIGITS.iter() {
            digits.push(tree.type_digit(Location::builtin(), *name, *width, *sign));
        }

        // Builtins are public so that import copies never hide them
        for decl in [unit, never, boolean, string].into_iter().chain(digits.iter().copied()) {
            tree.set_attribs(decl, Attributes::exported());
            let name: String = tree.name_of(decl).into();
            tree.declare(root, ScopeTag::Types, name, decl);
        }

        (root, Self { unit, never, boolean, string, digits })
    }

    /// Returns the builtin digit type of the given width and signedness.
    ///
    /// # Arguments
    /// - `width`: The width of the digit type, in bits.
    /// - `sign`: The signedness of the digit type.
    ///
    /// # Returns
    /// The handle to the matching builtin declaration.
    #[inline]
    pub fn digit(&self, width: DigitWidth, sign: Sign) -> DeclId {
        let windex: usize = match width {
            DigitWidth::W8 => 0,
            DigitWidth::W16 => 1,
            DigitWidth::W32 => 2,
            DigitWidth::W64 => 3,
        };
        self.digits[match sign {
            Sign::Signed => windex,
            Sign::Unsigned => 4 + windex,
        }]
    }
}
