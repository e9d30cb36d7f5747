//! JWT-Pruefung gegen das prozessweite Geheimnis
//!
//! Das Token traegt nur die Benutzer-ID und den Ablaufzeitpunkt; Rolle und
//! Anzeigename kommen aus dem Benutzer-Verzeichnis (siehe `dienst`).
//! Signatur: HS256. Die Ablauf-Pruefung uebernimmt jsonwebtoken.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sprechstunde_core::types::UserId;

use crate::error::{AuthError, AuthResult};

/// Claims im Bearer-Token des Identitaets-Stores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Benutzer-ID
    pub id: String,
    /// Ablaufzeit (Unix-Timestamp, Sekunden)
    pub exp: i64,
}

/// Prueft (und stellt fuer Tests aus) Bearer-Tokens
///
/// Zustandslos; alle Methoden sind ohne Sperren nebenlaeufig aufrufbar.
pub struct TokenPruefer {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl TokenPruefer {
    /// Erstellt einen neuen TokenPruefer aus dem gemeinsamen Geheimnis
    pub fn neu(geheimnis: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(geheimnis),
            encoding_key: EncodingKey::from_secret(geheimnis),
            validation,
        }
    }

    /// Prueft Signatur und Ablauf eines Tokens und gibt die Claims zurueck
    pub fn pruefen(&self, token: &str) -> AuthResult<TokenClaims> {
        let daten = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenAbgelaufen,
                _ => AuthError::TokenUngueltig(e.to_string()),
            },
        )?;
        Ok(daten.claims)
    }

    /// Stellt ein Token mit gegebener Gueltigkeit aus
    ///
    /// Nur fuer Tests und Ops-Tooling – die produktive Token-Ausgabe
    /// gehoert dem externen Identitaets-Store.
    pub fn ausstellen(&self, user_id: &UserId, gueltigkeit: chrono::Duration) -> AuthResult<String> {
        let claims = TokenClaims {
            id: user_id.as_str().to_string(),
            exp: (chrono::Utc::now() + gueltigkeit).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::intern(format!("Token-Ausstellung fehlgeschlagen: {}", e)))
    }
}
