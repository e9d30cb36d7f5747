//! Integrationstests fuer den Signaling-Service
//!
//! Startet den echten TCP-Listener auf Port 0 und spricht das Wire-Format
//! ueber Loopback-Verbindungen – Handshake-Gate, Anruf-Vermittlung und
//! Verdraengung bei Reconnect werden Ende-zu-Ende geprueft.

use futures_util::{SinkExt, StreamExt};
use sprechstunde_auth::{
    Benutzer, IdentitaetsDienst, InMemoryBenutzerVerzeichnis, TokenPruefer,
};
use sprechstunde_core::types::{Rolle, UserId};
use sprechstunde_protocol::signal::{
    AnrufAblehnung, AnrufAnnahme, AnrufRichtung, AnrufStart, AnrufStartArzt, HandshakeDaten,
};
use sprechstunde_protocol::wire::ClientCodec;
use sprechstunde_protocol::{ClientEvent, ServerEvent};
use sprechstunde_signaling::{SignalingKonfig, SignalingServer, SignalingState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_util::codec::Framed;

const GEHEIMNIS: &[u8] = b"integrationstest-geheimnis";

type TestState = Arc<SignalingState<InMemoryBenutzerVerzeichnis>>;
type TestVerbindung = Framed<TcpStream, ClientCodec>;

/// Startet einen Server mit Patient p1 (Alice) und Arzt d1 (Dr. Weber)
async fn test_server() -> (TestState, SocketAddr, watch::Sender<bool>) {
    let verzeichnis = InMemoryBenutzerVerzeichnis::neu();
    verzeichnis.eintragen(Benutzer {
        id: UserId::neu("p1"),
        name: "Alice".into(),
        rolle: Rolle::Patient,
    });
    verzeichnis.eintragen(Benutzer {
        id: UserId::neu("d1"),
        name: "Dr. Weber".into(),
        rolle: Rolle::Arzt,
    });

    let dienst = IdentitaetsDienst::neu(TokenPruefer::neu(GEHEIMNIS), Arc::new(verzeichnis));
    let state = SignalingState::neu(SignalingKonfig::default(), Arc::new(dienst));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(SignalingServer::starten_mit_listener(
        Arc::clone(&state),
        listener,
        shutdown_rx,
    ));

    (state, addr, shutdown_tx)
}

fn token_fuer(state: &TestState, user: &str) -> String {
    state
        .identitaet
        .pruefer()
        .ausstellen(&UserId::neu(user), chrono::Duration::minutes(5))
        .unwrap()
}

/// Verbindet sich und fuehrt den Handshake durch
async fn verbinden(addr: SocketAddr, token: &str) -> TestVerbindung {
    let stream = TcpStream::connect(addr).await.unwrap();
    let mut framed = Framed::new(stream, ClientCodec::new());

    framed
        .send(ClientEvent::Handshake(HandshakeDaten {
            token: token.into(),
        }))
        .await
        .unwrap();

    match framed.next().await.unwrap().unwrap() {
        ServerEvent::HandshakeOk(_) => framed,
        andere => panic!("Handshake fehlgeschlagen: {:?}", andere),
    }
}

async fn naechstes_event(framed: &mut TestVerbindung) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(2), framed.next())
        .await
        .expect("Timeout beim Warten auf Event")
        .expect("Verbindung unerwartet geschlossen")
        .expect("Dekodier-Fehler")
}

/// Wartet kurz und stellt sicher dass KEIN Event kommt
async fn kein_event(framed: &mut TestVerbindung) {
    let ergebnis = tokio::time::timeout(Duration::from_millis(300), framed.next()).await;
    match ergebnis {
        Err(_) => {}          // Timeout: nichts empfangen
        Ok(None) => {}        // Verbindung zu: auch nichts empfangen
        Ok(Some(event)) => panic!("Unerwartetes Event: {:?}", event),
    }
}

#[tokio::test]
async fn voller_anruf_ablauf_patient_zu_arzt() {
    let (state, addr, _shutdown) = test_server().await;

    let mut patient = verbinden(addr, &token_fuer(&state, "p1")).await;
    let mut arzt = verbinden(addr, &token_fuer(&state, "d1")).await;

    // Patient ruft an
    patient
        .send(ClientEvent::CallInitiate(AnrufStart {
            doctor_id: UserId::neu("d1"),
            patient_id: UserId::neu("p1"),
            channel_name: "c1".into(),
            caller_name: "Alice".into(),
        }))
        .await
        .unwrap();

    // Arzt bekommt genau ein call:incoming
    match naechstes_event(&mut arzt).await {
        ServerEvent::CallIncoming(eingehend) => {
            assert_eq!(eingehend.from, UserId::neu("p1"));
            assert_eq!(eingehend.from_name, "Alice");
            assert_eq!(eingehend.channel_name, "c1");
            assert_eq!(eingehend.richtung, AnrufRichtung::PatientZuArzt);
        }
        andere => panic!("Erwartet call:incoming, bekam {:?}", andere),
    }

    // Arzt nimmt an
    arzt.send(ClientEvent::CallAccept(AnrufAnnahme {
        channel_name: "c1".into(),
        to_user_id: UserId::neu("p1"),
    }))
    .await
    .unwrap();

    // Patient bekommt call:accepted mit der Identitaet des Arztes
    match naechstes_event(&mut patient).await {
        ServerEvent::CallAccepted(angenommen) => {
            assert_eq!(angenommen.channel_name, "c1");
            assert_eq!(angenommen.accepted_by, UserId::neu("d1"));
        }
        andere => panic!("Erwartet call:accepted, bekam {:?}", andere),
    }
}

#[tokio::test]
async fn arzt_ruft_patient_und_wird_abgelehnt() {
    let (state, addr, _shutdown) = test_server().await;

    let mut patient = verbinden(addr, &token_fuer(&state, "p1")).await;
    let mut arzt = verbinden(addr, &token_fuer(&state, "d1")).await;

    arzt.send(ClientEvent::CallInitiateArzt(AnrufStartArzt {
        patient_id: UserId::neu("p1"),
        doctor_id: UserId::neu("d1"),
        channel_name: "c2".into(),
        caller_name: "Dr. Weber".into(),
    }))
    .await
    .unwrap();

    match naechstes_event(&mut patient).await {
        ServerEvent::CallIncoming(eingehend) => {
            assert_eq!(eingehend.from, UserId::neu("d1"));
            assert_eq!(eingehend.richtung, AnrufRichtung::ArztZuPatient);
        }
        andere => panic!("Erwartet call:incoming, bekam {:?}", andere),
    }

    patient
        .send(ClientEvent::CallReject(AnrufAblehnung {
            to_user_id: UserId::neu("d1"),
        }))
        .await
        .unwrap();

    match naechstes_event(&mut arzt).await {
        ServerEvent::CallRejected(abgelehnt) => {
            assert_eq!(abgelehnt.rejected_by, UserId::neu("p1"));
        }
        andere => panic!("Erwartet call:rejected, bekam {:?}", andere),
    }
}

#[tokio::test]
async fn handshake_mit_ungueltigem_token_wird_abgelehnt() {
    let (state, addr, _shutdown) = test_server().await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let mut framed = Framed::new(stream, ClientCodec::new());
    framed
        .send(ClientEvent::Handshake(HandshakeDaten {
            token: "kein.echtes.token".into(),
        }))
        .await
        .unwrap();

    match naechstes_event(&mut framed).await {
        ServerEvent::HandshakeFehler(fehler) => {
            assert_eq!(fehler.message, "Authentication error");
        }
        andere => panic!("Erwartet handshake:error, bekam {:?}", andere),
    }

    // Kein Teilzustand: niemand wurde registriert
    assert_eq!(state.presence.online_anzahl(), 0);
}

#[tokio::test]
async fn unbekannter_benutzer_wird_abgelehnt() {
    let (state, addr, _shutdown) = test_server().await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let mut framed = Framed::new(stream, ClientCodec::new());
    framed
        .send(ClientEvent::Handshake(HandshakeDaten {
            token: token_fuer(&state, "geist"),
        }))
        .await
        .unwrap();

    match naechstes_event(&mut framed).await {
        ServerEvent::HandshakeFehler(fehler) => {
            assert_eq!(fehler.message, "User not found");
        }
        andere => panic!("Erwartet handshake:error, bekam {:?}", andere),
    }
    assert_eq!(state.presence.online_anzahl(), 0);
}

#[tokio::test]
async fn event_vor_handshake_wird_abgelehnt() {
    let (state, addr, _shutdown) = test_server().await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let mut framed = Framed::new(stream, ClientCodec::new());

    // Erstes Frame ist KEIN Handshake
    framed
        .send(ClientEvent::CallReject(AnrufAblehnung {
            to_user_id: UserId::neu("d1"),
        }))
        .await
        .unwrap();

    match naechstes_event(&mut framed).await {
        ServerEvent::HandshakeFehler(_) => {}
        andere => panic!("Erwartet handshake:error, bekam {:?}", andere),
    }
    assert_eq!(state.presence.online_anzahl(), 0);
}

#[tokio::test]
async fn initiate_an_offline_ziel_bleibt_still() {
    let (state, addr, _shutdown) = test_server().await;

    // Nur der Patient ist verbunden
    let mut patient = verbinden(addr, &token_fuer(&state, "p1")).await;

    patient
        .send(ClientEvent::CallInitiate(AnrufStart {
            doctor_id: UserId::neu("d1"),
            patient_id: UserId::neu("p1"),
            channel_name: "c1".into(),
            caller_name: "Alice".into(),
        }))
        .await
        .unwrap();

    // Kein Fehler, keine Bestaetigung – gar nichts
    kein_event(&mut patient).await;
}

#[tokio::test]
async fn reconnect_verdraengt_alte_verbindung() {
    let (state, addr, _shutdown) = test_server().await;

    let mut erste = verbinden(addr, &token_fuer(&state, "p1")).await;
    let mut zweite = verbinden(addr, &token_fuer(&state, "p1")).await;
    assert_eq!(state.presence.online_anzahl(), 1, "Ein Eintrag pro Benutzer");

    let mut arzt = verbinden(addr, &token_fuer(&state, "d1")).await;
    arzt.send(ClientEvent::CallInitiateArzt(AnrufStartArzt {
        patient_id: UserId::neu("p1"),
        doctor_id: UserId::neu("d1"),
        channel_name: "c3".into(),
        caller_name: "Dr. Weber".into(),
    }))
    .await
    .unwrap();

    // Nur die neueste Verbindung empfaengt das Relay
    match naechstes_event(&mut zweite).await {
        ServerEvent::CallIncoming(eingehend) => {
            assert_eq!(eingehend.channel_name, "c3");
        }
        andere => panic!("Erwartet call:incoming, bekam {:?}", andere),
    }
    kein_event(&mut erste).await;
}

#[tokio::test]
async fn reset_beim_handshake_hinterlaesst_keinen_eintrag() {
    let (state, addr, _shutdown) = test_server().await;

    // Client resettet die Verbindung direkt nach dem Handshake-Frame,
    // ohne die Bestaetigung zu lesen – das Senden von handshake:ok
    // schlaegt dann serverseitig fehl
    let stream = TcpStream::connect(addr).await.unwrap();
    stream.set_linger(Some(Duration::ZERO)).unwrap();
    let mut framed = Framed::new(stream, ClientCodec::new());
    framed
        .send(ClientEvent::Handshake(HandshakeDaten {
            token: token_fuer(&state, "p1"),
        }))
        .await
        .unwrap();
    drop(framed);

    // Der Presence-Eintrag darf den Tod der Verbindung nicht ueberleben
    let mut versuche = 0;
    while state.presence.ist_online(&UserId::neu("p1")) && versuche < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        versuche += 1;
    }
    assert!(!state.presence.ist_online(&UserId::neu("p1")));
}

#[tokio::test]
async fn disconnect_entfernt_nur_den_eigenen_eintrag() {
    let (state, addr, _shutdown) = test_server().await;

    let patient = verbinden(addr, &token_fuer(&state, "p1")).await;
    let _arzt = verbinden(addr, &token_fuer(&state, "d1")).await;
    assert_eq!(state.presence.online_anzahl(), 2);

    drop(patient);

    // Warten bis der Server den Disconnect verarbeitet hat
    let mut versuche = 0;
    while state.presence.ist_online(&UserId::neu("p1")) && versuche < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        versuche += 1;
    }

    assert!(!state.presence.ist_online(&UserId::neu("p1")));
    assert!(state.presence.ist_online(&UserId::neu("d1")), "Arzt bleibt online");
}
