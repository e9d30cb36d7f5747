//! Fehlertypen fuer die Identitaets-Pruefung

use thiserror::Error;

/// Alle moeglichen Fehler bei der Identitaets-Pruefung
///
/// Jeder dieser Fehler fuehrt an der Verbindungs-Grenze zur sofortigen
/// Ablehnung – es entsteht kein Teilzustand.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Kein Token uebermittelt")]
    TokenFehlt,

    #[error("Token ungueltig: {0}")]
    TokenUngueltig(String),

    #[error("Token abgelaufen")]
    TokenAbgelaufen,

    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

/// Result-Alias fuer die Identitaets-Pruefung
pub type AuthResult<T> = Result<T, AuthError>;
