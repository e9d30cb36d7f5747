//! sprechstunde-server – Bibliotheks-Root
//!
//! Verdrahtet Benutzer-Verzeichnis, Identitaets-Dienst, Token-Aussteller
//! und Signaling-Server und stellt den oeffentlichen Einstiegspunkt fuer
//! Integrationstests bereit.

pub mod config;
pub mod rest;

use anyhow::Result;
use config::ServerConfig;
use sprechstunde_auth::{Benutzer, IdentitaetsDienst, InMemoryBenutzerVerzeichnis, TokenPruefer};
use sprechstunde_core::types::UserId;
use sprechstunde_media::{MedienTokenAussteller, MedienTokenKonfig};
use sprechstunde_signaling::{SignalingKonfig, SignalingServer, SignalingState};
use std::sync::Arc;
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Benutzer-Verzeichnis und Identitaets-Dienst aufbauen
    /// 2. TCP-Signaling-Listener starten
    /// 3. REST-API starten (Token-Endpunkt, Health)
    /// 4. Auf Ctrl-C warten, dann geordneter Teardown
    pub async fn starten(self) -> Result<()> {
        if self.config.auth.jwt_geheimnis.is_empty() {
            anyhow::bail!(
                "JWT-Geheimnis fehlt ([auth].jwt_geheimnis oder SPRECHSTUNDE_JWT_GEHEIMNIS)"
            );
        }

        // Benutzer-Verzeichnis aus der Konfiguration fuellen
        let verzeichnis = InMemoryBenutzerVerzeichnis::neu();
        for eintrag in &self.config.benutzer {
            verzeichnis.eintragen(Benutzer {
                id: UserId::neu(&eintrag.id),
                name: eintrag.name.clone(),
                rolle: eintrag.rolle,
            });
        }
        tracing::info!(
            benutzer = verzeichnis.anzahl(),
            "Benutzer-Verzeichnis geladen"
        );

        let identitaet = Arc::new(IdentitaetsDienst::neu(
            TokenPruefer::neu(self.config.auth.jwt_geheimnis.as_bytes()),
            Arc::new(verzeichnis),
        ));

        let state = SignalingState::neu(
            SignalingKonfig {
                max_clients: self.config.server.max_clients,
                handshake_timeout_sek: self.config.server.handshake_timeout_sek,
            },
            identitaet,
        );

        let aussteller = Arc::new(MedienTokenAussteller::neu(MedienTokenKonfig::neu(
            self.config.medien.app_id.clone(),
            self.config.medien.app_zertifikat.clone(),
        )));
        if !aussteller.hat_app_id() || !aussteller.hat_zertifikat() {
            tracing::warn!(
                "Media-Provider unvollstaendig konfiguriert, /token liefert 400"
            );
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // TCP-Signaling
        let signaling_addr: std::net::SocketAddr =
            self.config.signaling_bind_adresse().parse()?;
        let signaling = SignalingServer::neu(Arc::clone(&state), signaling_addr);
        let mut signaling_task = tokio::spawn(signaling.starten(shutdown_rx));

        // REST-API
        let rest_state = rest::RestState {
            aussteller,
            presence: state.presence.clone(),
        };
        let api_adresse = self.config.api_bind_adresse();
        let api_listener = tokio::net::TcpListener::bind(&api_adresse).await?;
        tracing::info!(adresse = %api_adresse, "REST-API gestartet");
        let app = rest::router(rest_state);
        let mut api_task = tokio::spawn(async move { axum::serve(api_listener, app).await });

        tracing::info!(
            server_name = %self.config.server.name,
            "Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)..."
        );
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
            }
            ergebnis = &mut signaling_task => {
                ergebnis??;
                anyhow::bail!("Signaling-Listener unerwartet beendet");
            }
            ergebnis = &mut api_task => {
                ergebnis??;
                anyhow::bail!("REST-API unerwartet beendet");
            }
        }

        // Geordneter Teardown: Listener stoppen, Presence-Queues schliessen
        let _ = shutdown_tx.send(true);
        let _ = signaling_task.await;
        api_task.abort();

        Ok(())
    }
}
