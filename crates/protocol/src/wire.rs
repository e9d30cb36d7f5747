//! Wire-Format fuer die persistente Signaling-Verbindung
//!
//! Frame-basiertes Protokoll: Length(u32 big-endian) + JSON-Payload.
//!
//! ## Frame-Format
//!
//! ```text
//! +--------+--------+--------+--------+----...----+
//! | Laenge (u32 BE) | 4 Bytes        | Payload    |
//! +--------+--------+--------+--------+----...----+
//! ```
//!
//! Die Laenge gibt die Anzahl der Payload-Bytes an (ohne die 4 Laengen-Bytes).
//! Maximale Frame-Groesse ist konfigurierbar (Standard: 64 KB – Signaling-
//! Events sind klein).
//!
//! Der Codec ist generisch ueber die Ein- und Ausgangsrichtung, sodass
//! Server und Client (bzw. Integrationstests) dasselbe Frame-Format mit
//! vertauschten Event-Typen verwenden.

use bytes::{Buf, BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

use crate::signal::{ClientEvent, ServerEvent};

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Standard-maximale Frame-Groesse (64 KB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Groesse des Laengen-Felds in Bytes
pub const LENGTH_FIELD_SIZE: usize = 4;

// ---------------------------------------------------------------------------
// FrameCodec
// ---------------------------------------------------------------------------

/// tokio-util Codec fuer die frame-basierte Signaling-Verbindung
///
/// `Eingehend` ist der Typ der dekodiert wird, `Ausgehend` der Typ der
/// kodiert wird. Auf Serverseite ist das `ClientEvent` / `ServerEvent`
/// (siehe [`ServerCodec`]), auf Clientseite umgekehrt ([`ClientCodec`]).
#[derive(Debug)]
pub struct FrameCodec<Eingehend, Ausgehend> {
    /// Maximale erlaubte Frame-Groesse in Bytes
    max_frame_size: usize,
    _marker: PhantomData<(Eingehend, Ausgehend)>,
}

/// Codec auf Serverseite: liest `ClientEvent`, schreibt `ServerEvent`
pub type ServerCodec = FrameCodec<ClientEvent, ServerEvent>;

/// Codec auf Clientseite: liest `ServerEvent`, schreibt `ClientEvent`
pub type ClientCodec = FrameCodec<ServerEvent, ClientEvent>;

impl<Eingehend, Ausgehend> FrameCodec<Eingehend, Ausgehend> {
    /// Erstellt einen neuen `FrameCodec` mit Standard-Limits
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            _marker: PhantomData,
        }
    }

    /// Erstellt einen `FrameCodec` mit benutzerdefinierter maximaler Frame-Groesse
    pub fn with_max_size(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            _marker: PhantomData,
        }
    }

    /// Gibt die konfigurierte maximale Frame-Groesse zurueck
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl<Eingehend, Ausgehend> Default for FrameCodec<Eingehend, Ausgehend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Eingehend, Ausgehend> Clone for FrameCodec<Eingehend, Ausgehend> {
    fn clone(&self) -> Self {
        Self {
            max_frame_size: self.max_frame_size,
            _marker: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder-Implementierung
// ---------------------------------------------------------------------------

impl<Eingehend, Ausgehend> Decoder for FrameCodec<Eingehend, Ausgehend>
where
    Eingehend: DeserializeOwned,
{
    type Item = Eingehend;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Warte auf mindestens 4 Bytes fuer das Laengen-Feld
        if src.len() < LENGTH_FIELD_SIZE {
            return Ok(None);
        }

        // Laenge lesen (big-endian u32) ohne den Buffer zu veraendern
        let length = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

        // Maximale Frame-Groesse pruefen
        if length > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Frame zu gross: {} Bytes (Maximum: {} Bytes)",
                    length, self.max_frame_size
                ),
            ));
        }

        // Pruefen ob der vollstaendige Frame bereits im Buffer ist
        let total_size = LENGTH_FIELD_SIZE + length;
        if src.len() < total_size {
            // Speicher vorbelegen um Reallocations zu vermeiden
            src.reserve(total_size - src.len());
            return Ok(None);
        }

        // Laengen-Feld verbrauchen
        src.advance(LENGTH_FIELD_SIZE);

        // Payload-Bytes extrahieren
        let payload = src.split_to(length);

        // JSON deserialisieren
        let event: Eingehend = serde_json::from_slice(&payload).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON-Deserialisierung fehlgeschlagen: {}", e),
            )
        })?;

        Ok(Some(event))
    }
}

// ---------------------------------------------------------------------------
// Encoder-Implementierung
// ---------------------------------------------------------------------------

impl<Eingehend, Ausgehend> Encoder<Ausgehend> for FrameCodec<Eingehend, Ausgehend>
where
    Ausgehend: Serialize,
{
    type Error = io::Error;

    fn encode(&mut self, item: Ausgehend, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // JSON serialisieren
        let json = serde_json::to_vec(&item).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON-Serialisierung fehlgeschlagen: {}", e),
            )
        })?;

        // Groesse pruefen
        if json.len() > self.max_frame_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Event zu gross: {} Bytes (Maximum: {} Bytes)",
                    json.len(),
                    self.max_frame_size
                ),
            ));
        }

        // Laengen-Feld + Payload schreiben
        dst.reserve(LENGTH_FIELD_SIZE + json.len());
        dst.put_u32(json.len() as u32);
        dst.put_slice(&json);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
