//! Event-Dispatcher – Routet Client-Events an die Anruf-Vermittlung
//!
//! Laeuft pro Verbindung, NACH dem Handshake-Gate: jedes Event hier hat
//! bereits eine gepruefte Identitaet. Relays liefern nie eine Antwort an
//! den Ausloeser zurueck (fire-and-forget, siehe `relay`).
//!
//! Die `from`-Felder der Initiate-Events kommen aus dem Client-Payload,
//! `acceptedBy`/`rejectedBy` dagegen immer aus der authentifizierten
//! Identitaet der Verbindung.

use sprechstunde_auth::Identitaet;
use sprechstunde_protocol::{AnrufRichtung, ClientEvent};

use crate::relay::AnrufVermittlung;

/// Dispatcht Events einer authentifizierten Verbindung
#[derive(Clone)]
pub struct EventDispatcher {
    vermittlung: AnrufVermittlung,
}

impl EventDispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(vermittlung: AnrufVermittlung) -> Self {
        Self { vermittlung }
    }

    /// Verarbeitet ein Client-Event
    ///
    /// Gibt zurueck ob das Event beim Ziel eingereiht wurde. Der Wert
    /// dient Logging und Tests; an den Client geht er nicht zurueck.
    pub fn dispatch(&self, identitaet: &Identitaet, event: ClientEvent) -> bool {
        match event {
            ClientEvent::CallInitiate(start) => {
                tracing::info!(
                    patient = %start.patient_id,
                    arzt = %start.doctor_id,
                    "Anruf Patient -> Arzt"
                );
                self.vermittlung.initiieren(
                    &start.doctor_id,
                    start.patient_id,
                    start.caller_name,
                    start.channel_name,
                    AnrufRichtung::PatientZuArzt,
                )
            }

            ClientEvent::CallInitiateArzt(start) => {
                tracing::info!(
                    arzt = %start.doctor_id,
                    patient = %start.patient_id,
                    "Anruf Arzt -> Patient"
                );
                self.vermittlung.initiieren(
                    &start.patient_id,
                    start.doctor_id,
                    start.caller_name,
                    start.channel_name,
                    AnrufRichtung::ArztZuPatient,
                )
            }

            ClientEvent::CallAccept(annahme) => self.vermittlung.annehmen(
                &annahme.to_user_id,
                annahme.channel_name,
                identitaet.user_id.clone(),
            ),

            ClientEvent::CallReject(ablehnung) => self
                .vermittlung
                .ablehnen(&ablehnung.to_user_id, identitaet.user_id.clone()),

            // Ein zweiter Handshake auf einer authentifizierten Verbindung
            // ist ein Client-Fehler; er wird ignoriert.
            ClientEvent::Handshake(_) => {
                tracing::warn!(
                    user_id = %identitaet.user_id,
                    "Handshake auf bereits authentifizierter Verbindung ignoriert"
                );
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
