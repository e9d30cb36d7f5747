//! sprechstunde-auth – Identitaets-Pruefung
//!
//! Dieses Crate implementiert:
//! - JWT-Pruefung gegen das prozessweite Geheimnis (HS256, Ablauf-Pruefung)
//! - Das BenutzerVerzeichnis-Trait als Grenze zum externen Identitaets-Store
//! - IdentitaetsDienst: Token pruefen + Benutzer nachschlagen ergibt die
//!   unveraenderliche Identitaet einer Verbindung
//!
//! Credential-AUSGABE (Registrierung, Login, Passwoerter) gehoert dem
//! externen Identitaets-Store und ist hier bewusst nicht implementiert;
//! `TokenPruefer::ausstellen` existiert nur fuer Tests und Tooling.

pub mod dienst;
pub mod error;
pub mod token;
pub mod verzeichnis;

// Bequeme Re-Exporte
pub use dienst::{Identitaet, IdentitaetsDienst};
pub use error::{AuthError, AuthResult};
pub use token::{TokenClaims, TokenPruefer};
pub use verzeichnis::{Benutzer, BenutzerVerzeichnis, InMemoryBenutzerVerzeichnis};
