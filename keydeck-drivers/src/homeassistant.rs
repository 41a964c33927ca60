//! Home Assistant switch source
//!
//! Blocking REST client. Every request is bounded by [`REQUEST_TIMEOUT`],
//! so a stalled server costs at most one timeout per key per refresh.

use std::time::Duration;

use keydeck_core::button::{RemoteError, RemoteState, SwitchSource};
use keydeck_core::style::{has_prefix, GLYPH_PREFIX};
use keydeck_protocol::{service_path, state_path, EntityState, ServiceCall};
use log::debug;

/// Upper bound for every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Switch source backed by the Home Assistant REST API
pub struct HomeAssistant {
    base: String,
    token: String,
    agent: ureq::Agent,
}

impl HomeAssistant {
    /// Create a client for the API at `url`
    pub fn new(url: &str, token: &str) -> Self {
        let mut base = url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();

        Self {
            base,
            token: token.to_string(),
            agent,
        }
    }

    /// Base URL, always ending in `/`
    pub fn base(&self) -> &str {
        &self.base
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

fn classify(error: ureq::Error) -> RemoteError {
    match error {
        ureq::Error::Status(code, _) => RemoteError::Status(code),
        ureq::Error::Transport(transport) => RemoteError::Unreachable(transport.to_string()),
    }
}

impl SwitchSource for HomeAssistant {
    fn fetch(&self, entity: &str) -> Result<RemoteState, RemoteError> {
        let url = format!("{}{}", self.base, state_path(entity));
        debug!("GET {}", url);

        let body: EntityState = self
            .agent
            .get(&url)
            .set("Authorization", &self.bearer())
            .set("content-type", "application/json")
            .call()
            .map_err(classify)?
            .into_json()
            .map_err(|e| RemoteError::Malformed(e.to_string()))?;

        if body.entity_id != entity {
            return Err(RemoteError::EntityMismatch {
                expected: entity.to_string(),
                got: body.entity_id,
            });
        }

        Ok(RemoteState {
            on: body.is_on(),
            icon: glyph_icon(body.icon()),
            label: body.attributes.friendly_name,
        })
    }

    fn push(&self, entity: &str, on: bool) -> Result<(), RemoteError> {
        let url = format!("{}{}", self.base, service_path(on));
        debug!("POST {} ({})", url, entity);

        self.agent
            .post(&url)
            .set("Authorization", &self.bearer())
            .set("content-type", "application/json")
            .send_json(ServiceCall::new(entity))
            .map_err(classify)?;
        Ok(())
    }
}

/// Lower-cased glyph key when `icon` names a glyph
fn glyph_icon(icon: Option<&str>) -> Option<String> {
    icon.filter(|icon| has_prefix(icon, GLYPH_PREFIX))
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one canned HTTP response, returning the base URL and a handle
    /// yielding the raw request (head and body)
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            let mut content_length = 0;

            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                request.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }

            let mut payload = vec![0; content_length];
            reader.read_exact(&mut payload).unwrap();
            request.push_str(&String::from_utf8(payload).unwrap());

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            request
        });

        (base, handle)
    }

    #[test]
    fn test_glyph_icon() {
        assert_eq!(glyph_icon(Some("MDI:Lamp")).as_deref(), Some("mdi:lamp"));
        assert_eq!(glyph_icon(Some("hass:fan")), None);
        assert_eq!(glyph_icon(Some("md")), None);
        assert_eq!(glyph_icon(None), None);
    }

    #[test]
    fn test_base_gets_trailing_slash() {
        assert_eq!(HomeAssistant::new("http://hass:8123", "t").base(), "http://hass:8123/");
        assert_eq!(HomeAssistant::new("http://hass:8123/", "t").base(), "http://hass:8123/");
    }

    #[test]
    fn test_fetch_state_and_metadata() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"entity_id":"switch.lamp","state":"on","attributes":{"friendly_name":"Lamp","icon":"mdi:Lamp"}}"#,
        );
        let ha = HomeAssistant::new(&base, "secret");

        let state = ha.fetch("switch.lamp").unwrap();
        assert_eq!(
            state,
            RemoteState {
                on: true,
                label: Some("Lamp".into()),
                icon: Some("mdi:lamp".into()),
            }
        );

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/states/switch.lamp HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: bearer secret"));
    }

    #[test]
    fn test_fetch_entity_mismatch() {
        let (base, server) = serve_once("200 OK", r#"{"entity_id":"switch.other","state":"on"}"#);
        let ha = HomeAssistant::new(&base, "secret");

        assert_eq!(
            ha.fetch("switch.lamp"),
            Err(RemoteError::EntityMismatch {
                expected: "switch.lamp".into(),
                got: "switch.other".into(),
            })
        );
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_error_status() {
        let (base, server) = serve_once("401 Unauthorized", "{}");
        let ha = HomeAssistant::new(&base, "wrong");

        assert_eq!(ha.fetch("switch.lamp"), Err(RemoteError::Status(401)));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_malformed_body() {
        let (base, server) = serve_once("200 OK", "not json");
        let ha = HomeAssistant::new(&base, "secret");

        assert!(matches!(ha.fetch("switch.lamp"), Err(RemoteError::Malformed(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_unreachable() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let ha = HomeAssistant::new(&format!("http://127.0.0.1:{port}"), "secret");

        assert!(matches!(ha.fetch("switch.lamp"), Err(RemoteError::Unreachable(_))));
    }

    #[test]
    fn test_push_posts_service_call() {
        let (base, server) = serve_once("200 OK", "[]");
        let ha = HomeAssistant::new(&base, "secret");

        ha.push("switch.fan", false).unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/services/switch/turn_off HTTP/1.1"));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let call: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(call["entity_id"], "switch.fan");
    }
}
