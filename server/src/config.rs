//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Geheimnisse koennen per Umgebungsvariable
//! ueberschrieben werden und gehoeren nicht in die Datei.

use serde::{Deserialize, Serialize};
use sprechstunde_core::types::Rolle;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Auth-Einstellungen (JWT)
    pub auth: AuthEinstellungen,
    /// Media-Token-Einstellungen
    pub medien: MedienEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Bekannte Benutzer fuer das In-Memory-Verzeichnis
    #[serde(rename = "benutzer")]
    pub benutzer: Vec<BenutzerEintrag>,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Signaling-Verbindungen
    pub max_clients: u32,
    /// Timeout fuer den Verbindungs-Handshake in Sekunden
    pub handshake_timeout_sek: u64,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Sprechstunde Server".into(),
            max_clients: 512,
            handshake_timeout_sek: 10,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer beide Listener
    pub bind_adresse: String,
    /// Port fuer das TCP-Signaling
    pub signaling_port: u16,
    /// Port fuer die REST-API (Token-Endpunkt, Health)
    pub api_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            signaling_port: 9400,
            api_port: 8000,
        }
    }
}

/// Auth-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// HS256-Geheimnis fuer die JWT-Pruefung.
    /// Leer = nicht konfiguriert; der Server startet dann nicht.
    pub jwt_geheimnis: String,
}

/// Media-Token-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MedienEinstellungen {
    /// App-ID des Media-Providers (leer = nicht konfiguriert)
    pub app_id: String,
    /// App-Zertifikat des Media-Providers (leer = nicht konfiguriert)
    pub app_zertifikat: String,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Ein Benutzer-Eintrag fuer das In-Memory-Verzeichnis
///
/// Die Identitaeten kommen vom externen Identity-Provider; hier steht
/// nur, welche Benutzer-IDs der Server kennt und wie sie heissen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerEintrag {
    pub id: String,
    pub name: String,
    pub rolle: Rolle,
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht
    /// existiert; das zweite Element sagt, ob die Datei gefunden wurde
    /// (das Logging steht hier noch nicht, der Aufrufer meldet es).
    /// Umgebungsvariablen ueberschreiben die Geheimnisse.
    pub fn laden(pfad: &str) -> anyhow::Result<(Self, bool)> {
        let (mut config, aus_datei) = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config = toml::from_str::<Self>(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                (config, true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (Self::default(), false),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.umgebung_anwenden();
        Ok((config, aus_datei))
    }

    /// Wendet Umgebungsvariablen auf die Geheimnisse an
    fn umgebung_anwenden(&mut self) {
        if let Ok(geheimnis) = std::env::var("SPRECHSTUNDE_JWT_GEHEIMNIS") {
            self.auth.jwt_geheimnis = geheimnis;
        }
        if let Ok(app_id) = std::env::var("SPRECHSTUNDE_APP_ID") {
            self.medien.app_id = app_id;
        }
        if let Ok(zertifikat) = std::env::var("SPRECHSTUNDE_APP_ZERTIFIKAT") {
            self.medien.app_zertifikat = zertifikat;
        }
    }

    /// Gibt die Bind-Adresse fuer das TCP-Signaling zurueck
    pub fn signaling_bind_adresse(&self) -> String {
        format!(
            "{}:{}",
            self.netzwerk.bind_adresse, self.netzwerk.signaling_port
        )
    }

    /// Gibt die Bind-Adresse fuer die REST-API zurueck
    pub fn api_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.api_port)
    }
}
