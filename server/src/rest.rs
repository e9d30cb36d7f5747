//! REST-API – Token-Endpunkt und Health-Check
//!
//! Der Token-Endpunkt akzeptiert GET und POST; Parameter kommen aus dem
//! Query-String oder dem JSON-Body, wobei der Query-String gewinnt. Die
//! `uid` darf als Zahl oder als String ankommen, je nach Client.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use sprechstunde_media::{MedienTokenAussteller, MedienTokenFehler};
use sprechstunde_signaling::PresenceRegister;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Geteilter Zustand der REST-Handler
#[derive(Clone)]
pub struct RestState {
    pub aussteller: Arc<MedienTokenAussteller>,
    pub presence: PresenceRegister,
}

/// Erstellt den vollstaendigen REST-Router
pub fn router(state: RestState) -> Router {
    Router::new()
        .route("/token", get(token_abfragen).post(token_anfordern))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Token-Endpunkt
// ---------------------------------------------------------------------------

/// Uid aus Query oder Body – Zahl oder String, je nach Client
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UidFeld {
    Zahl(u32),
    Text(String),
}

impl UidFeld {
    /// `0`, `"0"` oder Unparsebares -> None, die Uid wird dann generiert
    fn als_uid(&self) -> Option<u32> {
        match self {
            UidFeld::Zahl(0) => None,
            UidFeld::Zahl(n) => Some(*n),
            UidFeld::Text(s) => match s.trim().parse::<u32>() {
                Ok(0) | Err(_) => None,
                Ok(n) => Some(n),
            },
        }
    }
}

/// Parameter des Token-Endpunkts
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenParameter {
    pub channel_name: Option<String>,
    pub uid: Option<UidFeld>,
}

impl TokenParameter {
    /// Feldweise Zusammenfuehrung, `self` (der Query-String) gewinnt
    fn zusammenfuehren(self, andere: TokenParameter) -> TokenParameter {
        TokenParameter {
            channel_name: self.channel_name.or(andere.channel_name),
            uid: self.uid.or(andere.uid),
        }
    }
}

/// GET /token – Parameter aus dem Query-String
async fn token_abfragen(
    State(state): State<RestState>,
    Query(parameter): Query<TokenParameter>,
) -> Response {
    token_ausstellen(&state, parameter)
}

/// POST /token – Parameter aus Query-String und JSON-Body
async fn token_anfordern(
    State(state): State<RestState>,
    Query(query): Query<TokenParameter>,
    body: Option<Json<TokenParameter>>,
) -> Response {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    token_ausstellen(&state, query.zusammenfuehren(body))
}

fn token_ausstellen(state: &RestState, parameter: TokenParameter) -> Response {
    let kanal = parameter.channel_name.as_deref();
    let uid = parameter.uid.as_ref().and_then(UidFeld::als_uid);

    match state.aussteller.ausstellen(kanal, uid) {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(MedienTokenFehler::KonfigurationFehlt(meldung)) => {
            tracing::warn!(fehler = %meldung, "Token-Anfrage ohne Konfiguration");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": meldung }))).into_response()
        }
        Err(MedienTokenFehler::Signierung(details)) => {
            tracing::error!(fehler = %details, "Token-Signierung fehlgeschlagen");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to generate token",
                    "message": "Token generation failed",
                    "details": details,
                    "envCheck": {
                        "hasAppId": state.aussteller.hat_app_id(),
                        "hasCertificate": state.aussteller.hat_zertifikat(),
                    }
                })),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// GET /health – Liveness-Probe mit aktueller Verbindungszahl
async fn health(State(state): State<RestState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "online": state.presence.online_anzahl(),
        })),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use sprechstunde_media::MedienTokenKonfig;
    use tower::ServiceExt;

    fn test_router(app_id: &str, zertifikat: &str) -> Router {
        let state = RestState {
            aussteller: Arc::new(MedienTokenAussteller::neu(MedienTokenKonfig::neu(
                app_id, zertifikat,
            ))),
            presence: PresenceRegister::neu(),
        };
        router(state)
    }

    async fn json_antwort(router: Router, anfrage: Request<Body>) -> (StatusCode, serde_json::Value) {
        let antwort = router.oneshot(anfrage).await.unwrap();
        let status = antwort.status();
        let bytes = antwort.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn get_token_mit_query_parametern() {
        let anfrage = Request::get("/token?channelName=c1&uid=42")
            .body(Body::empty())
            .unwrap();
        let (status, json) = json_antwort(test_router("app-1", "zert"), anfrage).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["channelName"], "c1");
        assert_eq!(json["uid"], 42);
        assert_eq!(json["appId"], "app-1");
        assert_eq!(json["expirationTime"], 3600);
        assert!(json["token"].is_string());
    }

    #[tokio::test]
    async fn post_token_query_gewinnt_gegen_body() {
        let anfrage = Request::post("/token?channelName=aus-query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"channelName":"aus-body","uid":"7"}"#))
            .unwrap();
        let (status, json) = json_antwort(test_router("app-1", "zert"), anfrage).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["channelName"], "aus-query");
        // uid stand nur im Body und wird von dort uebernommen
        assert_eq!(json["uid"], 7);
    }

    #[tokio::test]
    async fn post_token_ohne_body() {
        let anfrage = Request::post("/token").body(Body::empty()).unwrap();
        let (status, json) = json_antwort(test_router("app-1", "zert"), anfrage).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["channelName"], "mainRoom");
    }

    #[tokio::test]
    async fn uid_null_wird_generiert() {
        let anfrage = Request::get("/token?uid=0").body(Body::empty()).unwrap();
        let (status, json) = json_antwort(test_router("app-1", "zert"), anfrage).await;

        assert_eq!(status, StatusCode::OK);
        let uid = json["uid"].as_u64().unwrap();
        assert!(uid >= 1);
        assert!(uid <= (u32::MAX - 1) as u64);
    }

    #[tokio::test]
    async fn fehlende_konfiguration_gibt_400() {
        let anfrage = Request::get("/token").body(Body::empty()).unwrap();
        let (status, json) = json_antwort(test_router("", "zert"), anfrage).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        // 400 hat keinen envCheck, der gehoert nur zum 500er
        assert!(json.get("envCheck").is_none());
    }

    #[tokio::test]
    async fn health_antwortet() {
        let anfrage = Request::get("/health").body(Body::empty()).unwrap();
        let (status, json) = json_antwort(test_router("app-1", "zert"), anfrage).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["online"], 0);
    }

    #[test]
    fn uid_feld_parsen() {
        assert_eq!(UidFeld::Zahl(42).als_uid(), Some(42));
        assert_eq!(UidFeld::Zahl(0).als_uid(), None);
        assert_eq!(UidFeld::Text("42".into()).als_uid(), Some(42));
        assert_eq!(UidFeld::Text(" 7 ".into()).als_uid(), Some(7));
        assert_eq!(UidFeld::Text("0".into()).als_uid(), None);
        assert_eq!(UidFeld::Text("quatsch".into()).als_uid(), None);
        assert_eq!(UidFeld::Text("".into()).als_uid(), None);
    }
}
