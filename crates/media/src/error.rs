//! Fehlertypen fuer den Token-Aussteller

use thiserror::Error;

/// Fehler bei der Token-Ausstellung
///
/// Fehlende Konfiguration ist ein Client-Fehler (400 an der REST-Grenze)
/// und wird VOR dem Signieren geprueft; Signatur-Fehler sind unerwartete
/// interne Fehler (500).
#[derive(Debug, Error)]
pub enum MedienTokenFehler {
    #[error("{0}")]
    KonfigurationFehlt(String),

    #[error("Signierung fehlgeschlagen: {0}")]
    Signierung(String),
}

/// Result-Alias fuer den Token-Aussteller
pub type MedienTokenResult<T> = Result<T, MedienTokenFehler>;
