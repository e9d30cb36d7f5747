//! sprechstunde-media – Media-Session-Token
//!
//! Stellt die kurzlebigen, signierten Credentials aus, mit denen ein
//! Client einem benannten Media-Kanal beim Transport-Provider beitritt.
//! Reine Funktion ueber Konfiguration + Eingaben, kein Zustand.

pub mod aussteller;
pub mod error;

// Bequeme Re-Exporte
pub use aussteller::{MedienToken, MedienTokenAussteller, MedienTokenKonfig};
pub use error::{MedienTokenFehler, MedienTokenResult};
