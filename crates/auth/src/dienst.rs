//! Identitaets-Dienst – Token pruefen + Benutzer nachschlagen
//!
//! Kombiniert TokenPruefer und Benutzer-Verzeichnis zum Verbindungs-Gate:
//! erst wenn Signatur, Ablauf UND Benutzer-Existenz geprueft sind, steht
//! die Identitaet der Verbindung fest. Sie ist danach unveraenderlich.

use std::sync::Arc;

use sprechstunde_core::types::{Rolle, UserId};

use crate::error::{AuthError, AuthResult};
use crate::token::TokenPruefer;
use crate::verzeichnis::BenutzerVerzeichnis;

/// Die gepruefte Identitaet einer Verbindung
///
/// Wird einmal pro Verbindung aus dem Token abgeleitet und danach nie
/// mehr veraendert. Nicht persistiert.
#[derive(Debug, Clone, PartialEq)]
pub struct Identitaet {
    pub user_id: UserId,
    pub rolle: Rolle,
    pub name: String,
}

/// Identitaets-Dienst – prueft Bearer-Tokens und loest sie zu Identitaeten auf
pub struct IdentitaetsDienst<V: BenutzerVerzeichnis> {
    pruefer: TokenPruefer,
    verzeichnis: Arc<V>,
}

impl<V: BenutzerVerzeichnis> IdentitaetsDienst<V> {
    /// Erstellt einen neuen IdentitaetsDienst
    pub fn neu(pruefer: TokenPruefer, verzeichnis: Arc<V>) -> Self {
        Self {
            pruefer,
            verzeichnis,
        }
    }

    /// Authentifiziert ein Token und gibt die Identitaet zurueck
    ///
    /// Fehlendes, ungueltiges oder abgelaufenes Token sowie ein unbekannter
    /// Benutzer fuehren zu einem Fehler – der Aufrufer lehnt die Verbindung
    /// dann ab, bevor irgendein Zustand entsteht.
    pub async fn authentifizieren(&self, token: Option<&str>) -> AuthResult<Identitaet> {
        let token = token.ok_or(AuthError::TokenFehlt)?;
        let claims = self.pruefer.pruefen(token)?;

        let user_id = UserId::neu(claims.id);
        let benutzer = self
            .verzeichnis
            .finde_nach_id(&user_id)
            .await
            .ok_or_else(|| AuthError::BenutzerNichtGefunden(user_id.as_str().to_string()))?;

        tracing::debug!(
            user_id = %benutzer.id,
            rolle = %benutzer.rolle,
            "Token authentifiziert"
        );

        Ok(Identitaet {
            user_id: benutzer.id,
            rolle: benutzer.rolle,
            name: benutzer.name,
        })
    }

    /// Zugriff auf den TokenPruefer (fuer Tooling)
    pub fn pruefer(&self) -> &TokenPruefer {
        &self.pruefer
    }
}
