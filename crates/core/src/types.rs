//! Gemeinsame Identifikationstypen fuer Sprechstunde
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen. Benutzer-IDs
//! sind Strings (der Identitaets-Store vergibt Hex-Dokument-IDs),
//! Verbindungs-IDs sind lokal erzeugte UUIDs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Benutzer-ID
///
/// Kommt aus dem externen Identitaets-Store und wird hier nie erzeugt,
/// nur weitergereicht.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Erstellt eine UserId aus einem beliebigen String
    pub fn neu(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt die ID als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Eindeutige ID einer einzelnen Verbindung
///
/// Jede neue Signaling-Verbindung bekommt eine eigene VerbindungsId.
/// Damit laesst sich beim Disconnect unterscheiden, ob ein Presence-
/// Eintrag noch zu dieser Verbindung gehoert oder bereits von einer
/// neueren Verbindung desselben Benutzers ueberschrieben wurde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbindungsId(pub Uuid);

impl VerbindungsId {
    /// Erstellt eine neue zufaellige VerbindungsId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for VerbindungsId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "verbindung:{}", self.0)
    }
}

/// Rolle eines Benutzers im System
///
/// Die Wire-Namen ("patient", "doctor", "admin") sind vom Web-Client
/// vorgegeben und duerfen sich nicht aendern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rolle {
    #[serde(rename = "patient")]
    Patient,
    #[serde(rename = "doctor")]
    Arzt,
    #[serde(rename = "admin")]
    Admin,
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rolle::Patient => "patient",
            Rolle::Arzt => "doctor",
            Rolle::Admin => "admin",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbindungs_id_eindeutig() {
        let a = VerbindungsId::new();
        let b = VerbindungsId::new();
        assert_ne!(a, b, "Zwei neue VerbindungsIds muessen verschieden sein");
    }

    #[test]
    fn user_id_display() {
        let id = UserId::neu("64ab12");
        assert_eq!(id.to_string(), "user:64ab12");
    }

    #[test]
    fn user_id_serde_transparent() {
        let id = UserId::neu("abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123\"");
        let zurueck: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, id);
    }

    #[test]
    fn rolle_wire_namen() {
        assert_eq!(serde_json::to_string(&Rolle::Arzt).unwrap(), "\"doctor\"");
        assert_eq!(
            serde_json::from_str::<Rolle>("\"patient\"").unwrap(),
            Rolle::Patient
        );
        assert_eq!(Rolle::Admin.to_string(), "admin");
    }
}
