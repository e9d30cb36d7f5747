//! Presence-Register – Wer ist gerade verbunden?
//!
//! Haelt die einzige geteilte, veraenderliche Struktur des Realtime-Kerns:
//! die Zuordnung von Benutzer-ID zu lebendem Verbindungs-Handle. Pro
//! Benutzer existiert zu jedem Zeitpunkt hoechstens ein Eintrag; eine
//! neue Verbindung desselben Benutzers verdraengt die alte
//! (last-write-wins), deren Sende-Queue dabei geschlossen wird.
//!
//! Alle Operationen sind Einzel-Key-Zugriffe auf eine DashMap; mehr
//! Synchronisation braucht es nicht.

use dashmap::DashMap;
use sprechstunde_core::types::{UserId, VerbindungsId};
use sprechstunde_protocol::ServerEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Verbindung
pub const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue eines verbundenen Clients
///
/// Der Realtime-Kern haelt nur dieses Handle, nie den TCP-Stream selbst –
/// der gehoert dem Verbindungs-Task.
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub user_id: UserId,
    pub verbindungs_id: VerbindungsId,
    tx: mpsc::Sender<ServerEvent>,
}

impl ClientSender {
    /// Erstellt ein neues Handle
    pub fn neu(user_id: UserId, verbindungs_id: VerbindungsId, tx: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            user_id,
            verbindungs_id,
            tx,
        }
    }

    /// Sendet ein Event nicht-blockierend an den Client
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(user_id = %self.user_id, "Send-Queue voll – Event verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(user_id = %self.user_id, "Send-Queue geschlossen (Client getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PresenceRegister
// ---------------------------------------------------------------------------

/// Register aller verbundenen Benutzer
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
/// Lebensdauer: wird beim Serverstart erzeugt, an die Verbindungs-Tasks
/// gereicht und beim Shutdown ueber [`alle_schliessen`](Self::alle_schliessen)
/// abgeraeumt – kein impliziter globaler Zustand.
#[derive(Clone)]
pub struct PresenceRegister {
    inner: Arc<PresenceRegisterInner>,
}

struct PresenceRegisterInner {
    /// Verbindungs-Handles, indiziert nach UserId
    eintraege: DashMap<UserId, ClientSender>,
}

impl PresenceRegister {
    /// Erstellt ein neues, leeres PresenceRegister
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(PresenceRegisterInner {
                eintraege: DashMap::new(),
            }),
        }
    }

    /// Registriert eine Verbindung – last-write-wins
    ///
    /// Ueberschreibt einen bestehenden Eintrag desselben Benutzers
    /// bedingungslos und gibt das verdraengte Handle zurueck, damit der
    /// Aufrufer dessen Queue schliessen kann.
    pub fn registrieren(&self, sender: ClientSender) -> Option<ClientSender> {
        let user_id = sender.user_id.clone();
        let alt = self.inner.eintraege.insert(user_id.clone(), sender);
        if alt.is_some() {
            tracing::info!(user_id = %user_id, "Bestehende Verbindung verdraengt (Reconnect)");
        } else {
            tracing::info!(user_id = %user_id, "Client online");
        }
        alt
    }

    /// Gibt das Verbindungs-Handle eines Benutzers zurueck
    pub fn suchen(&self, user_id: &UserId) -> Option<ClientSender> {
        self.inner.eintraege.get(user_id).map(|e| e.value().clone())
    }

    /// Entfernt den Eintrag einer Verbindung beim Disconnect
    ///
    /// Entfernt nur, wenn der Eintrag noch zu genau dieser Verbindung
    /// gehoert – der verspaetete Disconnect einer verdraengten Verbindung
    /// darf den Eintrag ihres Nachfolgers nicht loeschen.
    /// Gibt `true` zurueck wenn ein Eintrag entfernt wurde.
    pub fn entfernen(&self, user_id: &UserId, verbindungs_id: VerbindungsId) -> bool {
        let entfernt = self
            .inner
            .eintraege
            .remove_if(user_id, |_, sender| sender.verbindungs_id == verbindungs_id)
            .is_some();
        if entfernt {
            tracing::info!(user_id = %user_id, "Client offline");
        }
        entfernt
    }

    /// Prueft ob ein Benutzer verbunden ist
    pub fn ist_online(&self, user_id: &UserId) -> bool {
        self.inner.eintraege.contains_key(user_id)
    }

    /// Gibt die Anzahl der verbundenen Benutzer zurueck
    pub fn online_anzahl(&self) -> usize {
        self.inner.eintraege.len()
    }

    /// Schliesst beim Shutdown alle Verbindungs-Handles
    ///
    /// Das Droppen der Sender schliesst die Send-Queues; die
    /// Verbindungs-Tasks beenden sich daraufhin von selbst.
    pub fn alle_schliessen(&self) {
        let anzahl = self.inner.eintraege.len();
        self.inner.eintraege.clear();
        tracing::info!(anzahl = anzahl, "Alle Presence-Eintraege geschlossen");
    }
}

impl Default for PresenceRegister {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
