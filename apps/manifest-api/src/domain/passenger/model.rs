//! Passenger record and its partial-update payload.
//!
//! Every attribute of a passenger is optional, and "absent" is distinct from
//! a zero-equivalent value: a field missing from an update payload means
//! "leave unchanged", while a field explicitly present (even at the type's
//! zero value) means "set to this value". The wire format therefore omits
//! `None` fields rather than serializing nulls.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored passenger record.
///
/// The identifier is assigned server-side when the record is created and is
/// never mutated by updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    /// Unique record identifier.
    #[serde(rename = "uuid")]
    pub id: Uuid,
    /// Whether the passenger survived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survived: Option<bool>,
    /// Ticket class (1, 2 or 3).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pclass: Option<i32>,
    /// Full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sex as recorded on the manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    /// Age in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Whether siblings or spouses were aboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siblings_spouses_aboard: Option<bool>,
    /// Whether parents or children were aboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents_children_aboard: Option<bool>,
    /// Fare paid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare: Option<f64>,
}

/// A partial passenger record as carried by create and update requests.
///
/// Identical to [`Passenger`] except that the identifier is optional: create
/// ignores it (the store assigns a fresh one), while PUT and PATCH use it
/// only as a correlation check against the identifier addressed by the
/// caller. The stored identifier is never taken from this payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassengerUpdate {
    /// Declared record identifier, if any. Correlation only.
    #[serde(rename = "uuid", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Whether the passenger survived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survived: Option<bool>,
    /// Ticket class (1, 2 or 3).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pclass: Option<i32>,
    /// Full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sex as recorded on the manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    /// Age in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Whether siblings or spouses were aboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siblings_spouses_aboard: Option<bool>,
    /// Whether parents or children were aboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents_children_aboard: Option<bool>,
    /// Fare paid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare: Option<f64>,
}

impl Passenger {
    /// Materialize a full record from an update payload, bound to `id`.
    ///
    /// Used when a create (or a replace-or-create on a missing identifier)
    /// turns a partial payload into the stored record. The payload's own
    /// declared identifier is ignored.
    #[must_use]
    pub fn from_update(id: Uuid, update: &PassengerUpdate) -> Self {
        Self {
            id,
            survived: update.survived,
            pclass: update.pclass,
            name: update.name.clone(),
            sex: update.sex.clone(),
            age: update.age,
            siblings_spouses_aboard: update.siblings_spouses_aboard,
            parents_children_aboard: update.parents_children_aboard,
            fare: update.fare,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let p = Passenger {
            id: Uuid::nil(),
            survived: None,
            pclass: None,
            name: Some("Alice".to_string()),
            sex: None,
            age: Some(0),
            siblings_spouses_aboard: None,
            parents_children_aboard: None,
            fare: None,
        };

        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains(r#""name":"Alice""#));
        // Present zero values serialize; absent fields do not.
        assert!(json.contains(r#""age":0"#));
        assert!(!json.contains("survived"));
        assert!(!json.contains("fare"));
    }

    #[test]
    fn update_distinguishes_absent_from_zero() {
        let json = r#"{"survived":false,"age":0}"#;
        let update: PassengerUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(update.survived, Some(false));
        assert_eq!(update.age, Some(0));
        assert_eq!(update.fare, None);
        assert_eq!(update.name, None);
    }

    #[test]
    fn from_update_ignores_declared_id() {
        let target = Uuid::new_v4();
        let update = PassengerUpdate {
            id: Some(Uuid::new_v4()),
            name: Some("Bob".to_string()),
            ..PassengerUpdate::default()
        };

        let p = Passenger::from_update(target, &update);
        assert_eq!(p.id, target);
        assert_eq!(p.name.as_deref(), Some("Bob"));
    }
}
