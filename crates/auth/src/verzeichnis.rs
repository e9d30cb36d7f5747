//! Benutzer-Verzeichnis – Grenze zum externen Identitaets-Store
//!
//! Der eigentliche Store (Benutzerverwaltung, Profile, Passwoerter) ist
//! ein externer Kollaborateur. Dieses Crate braucht von ihm genau eine
//! Operation: Benutzer nach ID nachschlagen. Das Trait haelt die Grenze
//! schmal; die In-Memory-Implementierung dient Verdrahtung und Tests.

use async_trait::async_trait;
use dashmap::DashMap;
use sprechstunde_core::types::{Rolle, UserId};

/// Ein Benutzer wie ihn der Identitaets-Store liefert
#[derive(Debug, Clone, PartialEq)]
pub struct Benutzer {
    pub id: UserId,
    pub name: String,
    pub rolle: Rolle,
}

/// Nachschlage-Grenze zum Identitaets-Store
#[async_trait]
pub trait BenutzerVerzeichnis: Send + Sync {
    /// Gibt den Benutzer zur ID zurueck, oder None wenn unbekannt
    async fn finde_nach_id(&self, id: &UserId) -> Option<Benutzer>;
}

/// In-Memory-Implementierung des Benutzer-Verzeichnisses
///
/// Thread-safe via DashMap. Fuer den Betrieb ohne angebundenen Store
/// (Entwicklung, Tests) werden Benutzer beim Start eingetragen.
#[derive(Debug, Default)]
pub struct InMemoryBenutzerVerzeichnis {
    benutzer: DashMap<UserId, Benutzer>,
}

impl InMemoryBenutzerVerzeichnis {
    /// Erstellt ein leeres Verzeichnis
    pub fn neu() -> Self {
        Self::default()
    }

    /// Traegt einen Benutzer ein (ueberschreibt bei gleicher ID)
    pub fn eintragen(&self, benutzer: Benutzer) {
        self.benutzer.insert(benutzer.id.clone(), benutzer);
    }

    /// Gibt die Anzahl der eingetragenen Benutzer zurueck
    pub fn anzahl(&self) -> usize {
        self.benutzer.len()
    }
}

#[async_trait]
impl BenutzerVerzeichnis for InMemoryBenutzerVerzeichnis {
    async fn finde_nach_id(&self, id: &UserId) -> Option<Benutzer> {
        self.benutzer.get(id).map(|e| e.value().clone())
    }
}
