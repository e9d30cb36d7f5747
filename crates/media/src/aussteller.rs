//! Media-Token-Aussteller
//!
//! Erzeugt ein signiertes, zeitlich begrenztes Credential fuer den Beitritt
//! zu einem Media-Kanal. Jeder Teilnehmer ist Publisher (senden UND
//! empfangen); Token-Ablauf und Privileg-Ablauf sind dasselbe Fenster,
//! es gibt keine separate Gnadenfrist.
//!
//! ## Token-Format
//!
//! ```text
//! base64url( version.appId.kanal.uid.rolle.ablauf.hex(hmac-sha256) )
//! ```
//!
//! Die HMAC-SHA256-Signatur laeuft ueber alle Felder vor ihr und wird mit
//! dem App-Zertifikat geschluesselt.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{MedienTokenFehler, MedienTokenResult};

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Konstanten
// ---------------------------------------------------------------------------

/// Kanalname wenn der Client keinen angibt
pub const STANDARD_KANAL: &str = "mainRoom";

/// Gueltigkeit des Tokens in Sekunden
pub const GUELTIGKEIT_SEK: u64 = 3600;

/// Rolle im Media-Kanal – jeder Teilnehmer darf senden und empfangen
const ROLLE_PUBLISHER: &str = "publisher";

/// Format-Version des Tokens
const TOKEN_VERSION: &str = "001";

// ---------------------------------------------------------------------------
// Konfiguration und Ergebnis
// ---------------------------------------------------------------------------

/// Prozess-Konfiguration des Ausstellers
///
/// Beide Strings koennen leer sein – das wird erst beim Ausstellen
/// geprueft und als Konfigurationsfehler gemeldet.
#[derive(Debug, Clone, Default)]
pub struct MedienTokenKonfig {
    pub app_id: String,
    pub app_zertifikat: String,
}

impl MedienTokenKonfig {
    pub fn neu(app_id: impl Into<String>, app_zertifikat: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_zertifikat: app_zertifikat.into(),
        }
    }
}

/// Ausgestelltes Media-Token samt Metadaten
///
/// Die Feldnamen entsprechen der JSON-Antwort des Token-Endpunkts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedienToken {
    pub token: String,
    pub app_id: String,
    pub channel_name: String,
    pub uid: u32,
    /// Gueltigkeit in Sekunden (nicht der absolute Ablaufzeitpunkt)
    pub expiration_time: u64,
}

// ---------------------------------------------------------------------------
// Aussteller
// ---------------------------------------------------------------------------

/// Stellt Media-Session-Tokens aus
///
/// Zustandslos; sicher nebenlaeufig aufrufbar.
pub struct MedienTokenAussteller {
    konfig: MedienTokenKonfig,
}

impl MedienTokenAussteller {
    /// Erstellt einen neuen Aussteller
    pub fn neu(konfig: MedienTokenKonfig) -> Self {
        Self { konfig }
    }

    /// Ob eine App-ID konfiguriert ist (fuer Diagnose-Antworten)
    pub fn hat_app_id(&self) -> bool {
        !self.konfig.app_id.is_empty()
    }

    /// Ob ein App-Zertifikat konfiguriert ist (fuer Diagnose-Antworten)
    pub fn hat_zertifikat(&self) -> bool {
        !self.konfig.app_zertifikat.is_empty()
    }

    /// Stellt ein Token fuer den gegebenen Kanal und Teilnehmer aus
    ///
    /// - `kanal`: None -> [`STANDARD_KANAL`]
    /// - `uid`: None oder 0 -> gleichverteilt zufaellig aus [1, 2^32 - 2]
    ///
    /// Konfigurations-Pruefung passiert VOR dem Signieren, damit die
    /// REST-Grenze 400 und 500 sauber unterscheiden kann.
    pub fn ausstellen(&self, kanal: Option<&str>, uid: Option<u32>) -> MedienTokenResult<MedienToken> {
        if self.konfig.app_id.is_empty() {
            return Err(MedienTokenFehler::KonfigurationFehlt(
                "App-ID ist nicht konfiguriert (SPRECHSTUNDE_APP_ID)".into(),
            ));
        }
        if self.konfig.app_zertifikat.is_empty() {
            return Err(MedienTokenFehler::KonfigurationFehlt(
                "App-Zertifikat ist nicht konfiguriert (SPRECHSTUNDE_APP_ZERTIFIKAT)".into(),
            ));
        }

        let kanal = match kanal {
            Some(k) if !k.is_empty() => k,
            _ => STANDARD_KANAL,
        };

        // 0 ist beim Provider "beliebiger Teilnehmer" und darum verboten;
        // der Wertebereich bleibt in 32 Bit unsigned.
        let uid = match uid {
            Some(u) if u != 0 => u,
            _ => rand::thread_rng().gen_range(1..=u32::MAX - 1),
        };

        let ablauf = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            + GUELTIGKEIT_SEK;

        let nutzlast = format!(
            "{}.{}.{}.{}.{}.{}",
            TOKEN_VERSION, self.konfig.app_id, kanal, uid, ROLLE_PUBLISHER, ablauf
        );

        let mut mac = HmacSha256::new_from_slice(self.konfig.app_zertifikat.as_bytes())
            .map_err(|e| MedienTokenFehler::Signierung(e.to_string()))?;
        mac.update(nutzlast.as_bytes());
        let signatur = hex::encode(mac.finalize().into_bytes());

        let token = URL_SAFE_NO_PAD.encode(format!("{}.{}", nutzlast, signatur));

        tracing::debug!(kanal = %kanal, uid = uid, "Media-Token ausgestellt");

        Ok(MedienToken {
            token,
            app_id: self.konfig.app_id.clone(),
            channel_name: kanal.to_string(),
            uid,
            expiration_time: GUELTIGKEIT_SEK,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
