//! Signaling-Events fuer die persistente Verbindung
//!
//! Alle Events werden als `{ "event": "...", "data": { ... } }` uebertragen.
//! Event-Namen (`call:initiate`, `call:incoming`, ...) und Feldnamen
//! (camelCase) entsprechen exakt dem Protokoll des Web-Clients und duerfen
//! sich nicht aendern.
//!
//! ## Design
//! - Tagged Enums fuer typsichere Event-Typen
//! - Der Handshake ist ein normales Client-Event, muss aber als erstes
//!   Frame der Verbindung kommen (siehe Signaling-Crate)

use serde::{Deserialize, Serialize};
use sprechstunde_core::types::{Rolle, UserId};

// ---------------------------------------------------------------------------
// Anruf-Richtung
// ---------------------------------------------------------------------------

/// Richtung eines Anrufs, wird dem Ziel als `type` mitgeliefert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnrufRichtung {
    #[serde(rename = "patient-to-doctor")]
    PatientZuArzt,
    #[serde(rename = "doctor-to-patient")]
    ArztZuPatient,
}

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Handshake-Daten: das Token kommt als Payload-Feld, nicht als Header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeDaten {
    pub token: String,
}

/// Anruf-Start Patient -> Arzt (`call:initiate`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnrufStart {
    pub doctor_id: UserId,
    pub patient_id: UserId,
    pub channel_name: String,
    pub caller_name: String,
}

/// Anruf-Start Arzt -> Patient (`call:initiate-doctor`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnrufStartArzt {
    pub patient_id: UserId,
    pub doctor_id: UserId,
    pub channel_name: String,
    pub caller_name: String,
}

/// Anruf-Annahme (`call:accept`) – `to_user_id` ist der urspruengliche Anrufer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnrufAnnahme {
    pub channel_name: String,
    pub to_user_id: UserId,
}

/// Anruf-Ablehnung (`call:reject`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnrufAblehnung {
    pub to_user_id: UserId,
}

/// Alle Events die ein Client an den Server senden kann
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "handshake")]
    Handshake(HandshakeDaten),
    #[serde(rename = "call:initiate")]
    CallInitiate(AnrufStart),
    #[serde(rename = "call:initiate-doctor")]
    CallInitiateArzt(AnrufStartArzt),
    #[serde(rename = "call:accept")]
    CallAccept(AnrufAnnahme),
    #[serde(rename = "call:reject")]
    CallReject(AnrufAblehnung),
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Bestaetigung des erfolgreichen Handshakes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeOk {
    pub user_id: UserId,
    pub name: String,
    pub role: Rolle,
}

/// Handshake abgelehnt – die Verbindung wird danach geschlossen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeFehler {
    pub message: String,
}

/// Eingehender Anruf beim Ziel (`call:incoming`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnrufEingehend {
    pub from: UserId,
    pub from_name: String,
    pub channel_name: String,
    #[serde(rename = "type")]
    pub richtung: AnrufRichtung,
}

/// Anruf wurde angenommen (`call:accepted`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnrufAngenommen {
    pub channel_name: String,
    pub accepted_by: UserId,
}

/// Anruf wurde abgelehnt (`call:rejected`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnrufAbgelehnt {
    pub rejected_by: UserId,
}

/// Alle Events die der Server an einen Client senden kann
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "handshake:ok")]
    HandshakeOk(HandshakeOk),
    #[serde(rename = "handshake:error")]
    HandshakeFehler(HandshakeFehler),
    #[serde(rename = "call:incoming")]
    CallIncoming(AnrufEingehend),
    #[serde(rename = "call:accepted")]
    CallAccepted(AnrufAngenommen),
    #[serde(rename = "call:rejected")]
    CallRejected(AnrufAbgelehnt),
}

impl ServerEvent {
    /// Baut ein `call:incoming`-Event
    pub fn eingehend(
        from: UserId,
        from_name: impl Into<String>,
        channel_name: impl Into<String>,
        richtung: AnrufRichtung,
    ) -> Self {
        Self::CallIncoming(AnrufEingehend {
            from,
            from_name: from_name.into(),
            channel_name: channel_name.into(),
            richtung,
        })
    }

    /// Baut ein `call:accepted`-Event
    pub fn angenommen(channel_name: impl Into<String>, accepted_by: UserId) -> Self {
        Self::CallAccepted(AnrufAngenommen {
            channel_name: channel_name.into(),
            accepted_by,
        })
    }

    /// Baut ein `call:rejected`-Event
    pub fn abgelehnt(rejected_by: UserId) -> Self {
        Self::CallRejected(AnrufAbgelehnt { rejected_by })
    }

    /// Baut ein `handshake:error`-Event
    pub fn handshake_fehler(message: impl Into<String>) -> Self {
        Self::HandshakeFehler(HandshakeFehler {
            message: message.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
