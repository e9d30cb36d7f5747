//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `SignalingServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer
//! `ClientVerbindung`. Beim Shutdown werden alle Presence-Eintraege
//! geschlossen; die Verbindungs-Tasks beenden sich daraufhin selbst.

use sprechstunde_auth::BenutzerVerzeichnis;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::connection::ClientVerbindung;
use crate::server_state::SignalingState;

/// TCP-Signaling-Server
///
/// Bindet einen TCP-Socket und akzeptiert Verbindungen in einer Loop.
pub struct SignalingServer<V: BenutzerVerzeichnis + 'static> {
    state: Arc<SignalingState<V>>,
    bind_addr: SocketAddr,
}

impl<V: BenutzerVerzeichnis + 'static> SignalingServer<V> {
    /// Erstellt einen neuen SignalingServer
    pub fn neu(state: Arc<SignalingState<V>>, bind_addr: SocketAddr) -> Self {
        Self {
            state,
            bind_addr,
        }
    }

    /// Startet den TCP-Listener und akzeptiert Verbindungen
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt.
    pub async fn starten(
        self,
        shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        Self::starten_mit_listener(self.state, listener, shutdown_rx).await
    }

    /// Accept-Loop auf einem bereits gebundenen Listener
    ///
    /// Getrennt herausgefuehrt, damit Integrationstests Port 0 binden
    /// und die lokale Adresse vorher abfragen koennen.
    pub async fn starten_mit_listener(
        state: Arc<SignalingState<V>>,
        listener: TcpListener,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let lokale_addr = listener.local_addr()?;
        tracing::info!(adresse = %lokale_addr, "TCP Signaling-Server gestartet");

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            // Client-Limit pruefen
                            let online = state.presence.online_anzahl() as u32;
                            if online >= state.config.max_clients {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max = state.config.max_clients,
                                    "Server voll – Verbindung abgelehnt"
                                );
                                drop(stream);
                                continue;
                            }

                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");

                            let verbindung =
                                ClientVerbindung::neu(Arc::clone(&state), peer_addr);
                            tokio::spawn(async move {
                                if let Err(fehler) = verbindung.verarbeiten(stream).await {
                                    tracing::warn!(
                                        peer = %peer_addr,
                                        fehler = %fehler,
                                        "Verbindung mit Fehler beendet"
                                    );
                                }
                            });
                        }
                        Err(fehler) => {
                            tracing::error!(fehler = %fehler, "Accept fehlgeschlagen");
                        }
                    }
                }

                // Shutdown-Signal
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Shutdown-Signal empfangen, Listener wird beendet");
                        break;
                    }
                }
            }
        }

        // Definierter Teardown statt implizitem globalen Zustand
        state.presence.alle_schliessen();
        Ok(())
    }
}
