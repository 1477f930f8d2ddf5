use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Wire names shared with the server half of the protocol.
///
/// These must match the server byte for byte; the defaults are the names
/// every existing server adapter speaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Header marking a response as a page payload.
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
    /// Header carrying the target of an external redirect (sent with 409).
    #[serde(default = "default_location_header")]
    pub location_header: String,
    /// Header carrying the client asset version.
    #[serde(default = "default_version_header")]
    pub version_header: String,
    /// Header naming the component a partial reload targets.
    #[serde(default = "default_partial_component_header")]
    pub partial_component_header: String,
    /// Header listing the props a partial reload asks for.
    #[serde(default = "default_partial_data_header")]
    pub partial_data_header: String,
    /// Header listing the props a partial reload leaves out.
    #[serde(default = "default_partial_except_header")]
    pub partial_except_header: String,
    /// Header naming the error bag validation errors are scoped to.
    #[serde(default = "default_error_bag_header")]
    pub error_bag_header: String,
    /// Session storage key of the location-visit resume marker.
    #[serde(default = "default_location_visit_key")]
    pub location_visit_key: String,
}

/// History persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Encrypt history entries for pages that do not set `encryptHistory`.
    #[serde(default)]
    pub encrypt: bool,
}

/// Settings for the bundled HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Origin relative visit URLs resolve against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Total request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

fn default_signature_header() -> String {
    "X-Inertia".to_string()
}

fn default_location_header() -> String {
    "X-Inertia-Location".to_string()
}

fn default_version_header() -> String {
    "X-Inertia-Version".to_string()
}

fn default_partial_component_header() -> String {
    "X-Inertia-Partial-Component".to_string()
}

fn default_partial_data_header() -> String {
    "X-Inertia-Partial-Data".to_string()
}

fn default_partial_except_header() -> String {
    "X-Inertia-Partial-Except".to_string()
}

fn default_error_bag_header() -> String {
    "X-Inertia-Error-Bag".to_string()
}

fn default_location_visit_key() -> String {
    "inertiaLocationVisit".to_string()
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            signature_header: default_signature_header(),
            location_header: default_location_header(),
            version_header: default_version_header(),
            partial_component_header: default_partial_component_header(),
            partial_data_header: default_partial_data_header(),
            partial_except_header: default_partial_except_header(),
            error_bag_header: default_error_bag_header(),
            location_visit_key: default_location_visit_key(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}
