//! Field-wise merge of a partial update onto an existing record.
//!
//! This is the single authority for update semantics: both store variants and
//! both PUT/PATCH paths call it, so the two backends cannot drift apart.

use super::model::{Passenger, PassengerUpdate};

/// Merge `incoming` onto `existing`, attribute by attribute.
///
/// For each attribute, a value present in `incoming` wins; an absent one
/// retains `existing`'s value. The identifier always comes from `existing` —
/// callers that need a different binding (replace-or-create on a missing
/// identifier) materialize the record themselves via
/// [`Passenger::from_update`].
#[must_use]
pub fn merge(existing: &Passenger, incoming: &PassengerUpdate) -> Passenger {
    Passenger {
        id: existing.id,
        survived: incoming.survived.or(existing.survived),
        pclass: incoming.pclass.or(existing.pclass),
        name: incoming.name.clone().or_else(|| existing.name.clone()),
        sex: incoming.sex.clone().or_else(|| existing.sex.clone()),
        age: incoming.age.or(existing.age),
        siblings_spouses_aboard: incoming
            .siblings_spouses_aboard
            .or(existing.siblings_spouses_aboard),
        parents_children_aboard: incoming
            .parents_children_aboard
            .or(existing.parents_children_aboard),
        fare: incoming.fare.or(existing.fare),
    }
}
