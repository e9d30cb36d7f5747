//! Client-Verbindung – Verwaltet eine einzelne Signaling-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientVerbindung` in einem eigenen
//! tokio-Task.
//!
//! ## Ablauf
//! ```text
//! Verbunden -> Handshake (Token pruefen) -> Registriert -> Event-Loop
//!     |              |                                        |
//!     |              v (Fehler/Timeout)                       v (EOF, Fehler,
//!     +---- handshake:error senden, schliessen                 Queue zu)
//!                                                  Presence-Eintrag entfernen
//! ```
//!
//! Vor erfolgreichem Handshake wird kein Event verarbeitet und kein
//! Presence-Eintrag angelegt; bei Ablehnung entsteht kein Teilzustand.
//! Events einer Verbindung werden in Empfangsreihenfolge verarbeitet.

use futures_util::{SinkExt, StreamExt};
use sprechstunde_auth::{AuthError, BenutzerVerzeichnis, Identitaet};
use sprechstunde_protocol::signal::HandshakeOk;
use sprechstunde_protocol::wire::ServerCodec;
use sprechstunde_protocol::{ClientEvent, ServerEvent};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;

use crate::dispatcher::EventDispatcher;
use crate::error::{SignalingError, SignalingResult};
use crate::presence::{ClientSender, SEND_QUEUE_GROESSE};
use crate::server_state::SignalingState;
use sprechstunde_core::types::VerbindungsId;

/// Verarbeitet eine einzelne Signaling-Verbindung
///
/// Liest Frames via `ServerCodec`, dispatcht an den `EventDispatcher`
/// und schreibt Events aus der eigenen Send-Queue zurueck. Laeuft in
/// einem eigenen tokio-Task.
pub struct ClientVerbindung<V: BenutzerVerzeichnis + 'static> {
    state: Arc<SignalingState<V>>,
    peer_addr: SocketAddr,
}

impl<V: BenutzerVerzeichnis + 'static> ClientVerbindung<V> {
    /// Erstellt eine neue ClientVerbindung
    pub fn neu(state: Arc<SignalingState<V>>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Verarbeitet die Verbindung bis zum Disconnect
    pub async fn verarbeiten(self, stream: TcpStream) -> SignalingResult<()> {
        let mut framed = Framed::new(stream, ServerCodec::new());

        // Handshake-Gate: erst Identitaet, dann alles andere
        let identitaet = match self.handshake(&mut framed).await {
            Ok(identitaet) => identitaet,
            Err(fehler) => {
                tracing::info!(
                    peer = %self.peer_addr,
                    fehler = %fehler,
                    "Handshake abgelehnt"
                );
                // Ablehnung mitteilen, dann schliessen – Best-Effort
                let _ = framed
                    .send(ServerEvent::handshake_fehler(handshake_fehlertext(&fehler)))
                    .await;
                return Ok(());
            }
        };

        // Registrierung: neueste Verbindung gewinnt; die verdraengte Queue
        // wird durch das Droppen des alten Handles geschlossen
        let verbindungs_id = VerbindungsId::new();
        let (tx, mut rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        let alt = self.state.presence.registrieren(ClientSender::neu(
            identitaet.user_id.clone(),
            verbindungs_id,
            tx,
        ));
        drop(alt);

        let ergebnis = self.bedienen(&mut framed, &mut rx, &identitaet).await;

        // Disconnect: nur den eigenen Eintrag entfernen. Laeuft auf jedem
        // Pfad nach der Registrierung, auch wenn schon das handshake:ok
        // nicht mehr zustellbar war – sonst ueberlebt der Eintrag seine
        // tote Verbindung.
        self.state
            .presence
            .entfernen(&identitaet.user_id, verbindungs_id);
        tracing::info!(user_id = %identitaet.user_id, "Verbindung getrennt");

        ergebnis
    }

    /// Bestaetigt den Handshake und bedient die Verbindung
    ///
    /// Zwischen Registrierung und Rueckkehr aus dieser Methode gibt es
    /// keinen weiteren Ausstieg; der Aufrufer entfernt den Presence-
    /// Eintrag direkt im Anschluss.
    async fn bedienen(
        &self,
        framed: &mut Framed<TcpStream, ServerCodec>,
        rx: &mut mpsc::Receiver<ServerEvent>,
        identitaet: &Identitaet,
    ) -> SignalingResult<()> {
        framed
            .send(ServerEvent::HandshakeOk(HandshakeOk {
                user_id: identitaet.user_id.clone(),
                name: identitaet.name.clone(),
                role: identitaet.rolle,
            }))
            .await?;

        tracing::info!(
            user_id = %identitaet.user_id,
            name = %identitaet.name,
            peer = %self.peer_addr,
            "Verbindung authentifiziert"
        );

        let dispatcher = EventDispatcher::neu(self.state.vermittlung.clone());
        self.event_loop(framed, rx, &dispatcher, identitaet).await
    }

    /// Wartet auf das Handshake-Frame und prueft die Identitaet
    ///
    /// Das Token kommt als Feld im Handshake-Payload, nicht als Header.
    /// Die Pruefung ist asynchron (Signatur + Benutzer-Nachschlag); bis
    /// sie abgeschlossen ist, wird kein weiteres Frame gelesen.
    async fn handshake(
        &self,
        framed: &mut Framed<TcpStream, ServerCodec>,
    ) -> SignalingResult<Identitaet> {
        let timeout = Duration::from_secs(self.state.config.handshake_timeout_sek);

        let erstes = tokio::time::timeout(timeout, framed.next())
            .await
            .map_err(|_| SignalingError::HandshakeTimeout)?
            .ok_or(SignalingError::VerbindungGetrennt)??;

        let token = match erstes {
            ClientEvent::Handshake(daten) => daten.token,
            andere => {
                tracing::warn!(peer = %self.peer_addr, event = ?andere, "Frame vor Handshake");
                return Err(SignalingError::protokoll(
                    "Erstes Frame muss der Handshake sein",
                ));
            }
        };

        let identitaet = self
            .state
            .identitaet
            .authentifizieren(Some(token.as_str()))
            .await?;

        Ok(identitaet)
    }

    /// Event-Loop nach erfolgreichem Handshake
    ///
    /// Multiplext eingehende Frames und die eigene Send-Queue. Endet bei
    /// EOF, Dekodier-Fehler oder geschlossener Queue (Shutdown oder
    /// Verdraengung durch eine neuere Verbindung desselben Benutzers).
    async fn event_loop(
        &self,
        framed: &mut Framed<TcpStream, ServerCodec>,
        rx: &mut mpsc::Receiver<ServerEvent>,
        dispatcher: &EventDispatcher,
        identitaet: &Identitaet,
    ) -> SignalingResult<()> {
        loop {
            tokio::select! {
                eingehend = framed.next() => {
                    match eingehend {
                        Some(Ok(event)) => {
                            dispatcher.dispatch(identitaet, event);
                        }
                        Some(Err(fehler)) => {
                            tracing::warn!(
                                user_id = %identitaet.user_id,
                                fehler = %fehler,
                                "Ungueltiges Frame – Verbindung wird geschlossen"
                            );
                            return Err(SignalingError::Io(fehler));
                        }
                        None => return Ok(()),
                    }
                }
                ausgehend = rx.recv() => {
                    match ausgehend {
                        Some(event) => framed.send(event).await?,
                        // Queue geschlossen: Shutdown oder verdraengt
                        None => return Ok(()),
                    }
                }
            }
        }
    }
}

/// Client-sichtbarer Fehlertext fuer abgelehnte Handshakes
///
/// Die Texte sind vom Web-Client vorgegeben; Details zur Ablehnung
/// bleiben im Server-Log.
fn handshake_fehlertext(fehler: &SignalingError) -> &'static str {
    match fehler {
        SignalingError::Auth(AuthError::BenutzerNichtGefunden(_)) => "User not found",
        _ => "Authentication error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehlertexte_fuer_den_client() {
        let unbekannt = SignalingError::Auth(AuthError::BenutzerNichtGefunden("x".into()));
        assert_eq!(handshake_fehlertext(&unbekannt), "User not found");

        let abgelaufen = SignalingError::Auth(AuthError::TokenAbgelaufen);
        assert_eq!(handshake_fehlertext(&abgelaufen), "Authentication error");

        let timeout = SignalingError::HandshakeTimeout;
        assert_eq!(handshake_fehlertext(&timeout), "Authentication error");
    }
}
