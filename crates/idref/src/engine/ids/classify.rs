//! Name-based ID/IDREF attribute classification.
//!
//! Without schema information there is no way to know which attributes are
//! typed `xs:ID` or `xs:IDREF(S)`, so attributes are classified by their local
//! name, case-insensitively:
//! - IDREF: the name contains `idref`,
//! - ID: the name contains `id` but not `idref`.
//!
//! This is a substring match: `valid`, `guide` or `width` count as ID
//! attributes.

use super::Direction;

const ID: &str = "id";
const IDREF: &str = "idref";

/// Local part of a possibly prefixed name.
fn local(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, l)| l)
}

/// Checks whether an attribute with the given name carries identifiers for `direction`.
pub fn is_id_attribute(name: &str, direction: Direction) -> bool {
    let lc = local(name).to_lowercase();
    match direction {
        Direction::IdRef => lc.contains(IDREF),
        Direction::Id => lc.contains(ID) && !lc.contains(IDREF),
    }
}
