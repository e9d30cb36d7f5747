//! Anruf-Vermittlung – Relay der Signaling-Events zwischen Verbindungen
//!
//! Jede Operation ist ein Registry-Lookup plus ein nicht-blockierendes
//! Senden an das Ziel. Ist das Ziel nicht verbunden, wird das Event still
//! verworfen – das ist gewolltes Best-Effort-Verhalten (at-most-once),
//! kein Fehler. Der Rueckgabewert `delivered` macht das Verhalten fuer
//! Aufrufer und Tests beobachtbar; an den Ausloeser zurueckgemeldet wird
//! er nicht.
//!
//! Der Server fuehrt keinerlei Anruf-Zustand: wer wen eingeladen hat,
//! lebt nur in den Events selbst. Accept und Reject vertrauen deshalb der
//! client-seitigen Ziel-Angabe (siehe DESIGN.md).

use sprechstunde_core::types::UserId;
use sprechstunde_protocol::{AnrufRichtung, ServerEvent};

use crate::presence::PresenceRegister;

/// Vermittelt Anruf-Events anhand des Presence-Registers
#[derive(Clone)]
pub struct AnrufVermittlung {
    presence: PresenceRegister,
}

impl AnrufVermittlung {
    /// Erstellt eine neue AnrufVermittlung
    pub fn neu(presence: PresenceRegister) -> Self {
        Self { presence }
    }

    /// Relayt einen Anruf-Start an das Ziel (`call:incoming`)
    ///
    /// Fire-and-forget: der Initiator bekommt weder Zustell- noch
    /// Fehlschlag-Signal. Gibt `true` zurueck wenn das Event beim Ziel
    /// eingereiht wurde.
    pub fn initiieren(
        &self,
        ziel: &UserId,
        von: UserId,
        anrufer_name: String,
        kanal: String,
        richtung: AnrufRichtung,
    ) -> bool {
        match self.presence.suchen(ziel) {
            Some(handle) => {
                tracing::info!(
                    von = %von,
                    ziel = %ziel,
                    kanal = %kanal,
                    richtung = ?richtung,
                    "Anruf wird vermittelt"
                );
                handle.senden(ServerEvent::eingehend(von, anrufer_name, kanal, richtung))
            }
            None => {
                tracing::debug!(ziel = %ziel, "Anruf-Ziel nicht verbunden – Event verworfen");
                false
            }
        }
    }

    /// Relayt eine Annahme an den urspruenglichen Anrufer (`call:accepted`)
    pub fn annehmen(&self, ziel: &UserId, kanal: String, angenommen_von: UserId) -> bool {
        match self.presence.suchen(ziel) {
            Some(handle) => handle.senden(ServerEvent::angenommen(kanal, angenommen_von)),
            None => {
                tracing::debug!(ziel = %ziel, "Annahme-Ziel nicht verbunden – Event verworfen");
                false
            }
        }
    }

    /// Relayt eine Ablehnung an den urspruenglichen Anrufer (`call:rejected`)
    pub fn ablehnen(&self, ziel: &UserId, abgelehnt_von: UserId) -> bool {
        match self.presence.suchen(ziel) {
            Some(handle) => handle.senden(ServerEvent::abgelehnt(abgelehnt_von)),
            None => {
                tracing::debug!(ziel = %ziel, "Ablehnungs-Ziel nicht verbunden – Event verworfen");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
