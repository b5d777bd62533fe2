//! Peer addresses: `/counselor/<session>` and `/client/<session>`.

use std::fmt;
use std::str::FromStr;

use crate::error::{FakebotError, Result};
use crate::relay::{PeerRole, SessionId};

/// Address of one side of a relayed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRoute {
    pub role: PeerRole,
    pub session: SessionId,
}

impl PeerRoute {
    pub fn new(role: PeerRole, session: SessionId) -> Self {
        Self { role, session }
    }

    /// Route of the other side of the same session.
    pub fn counterpart(&self) -> Self {
        Self::new(self.role.counterpart(), self.session.clone())
    }

    pub fn path(&self) -> String {
        format!("/{}/{}", self.role.route_segment(), self.session)
    }

    /// Fully-qualified address for sharing out of band.
    pub fn url(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for PeerRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for PeerRoute {
    type Err = FakebotError;

    /// Accepts a bare path or a full URL; query and fragment are ignored.
    fn from_str(input: &str) -> Result<Self> {
        let without_scheme = input
            .split_once("://")
            .map(|(_, rest)| rest.find('/').map_or("", |i| &rest[i..]))
            .unwrap_or(input);
        let path = without_scheme
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let [role, session] = segments.as_slice() else {
            return Err(FakebotError::invalid_session(format!(
                "'{}' is not a peer address (expected /counselor/<id> or /client/<id>)",
                input
            )));
        };

        let role = match *role {
            "counselor" => PeerRole::Counselor,
            "client" => PeerRole::Client,
            other => {
                return Err(FakebotError::invalid_session(format!(
                    "unknown peer role '{}'",
                    other
                )));
            }
        };

        Ok(Self::new(role, SessionId::new(*session)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_url() {
        let route = PeerRoute::new(PeerRole::Counselor, SessionId::new("42").unwrap());
        assert_eq!(route.path(), "/counselor/42");
        assert_eq!(
            route.counterpart().url("http://localhost:8080/"),
            "http://localhost:8080/client/42"
        );
    }

    #[test]
    fn test_parse_path_and_url() {
        let route: PeerRoute = "/client/42".parse().unwrap();
        assert_eq!(route.role, PeerRole::Client);
        assert_eq!(route.session.as_str(), "42");

        let route: PeerRoute = "https://fake.example/counselor/1718000000000?x=1#top"
            .parse()
            .unwrap();
        assert_eq!(route.role, PeerRole::Counselor);
        assert_eq!(route.session.as_str(), "1718000000000");
    }

    #[test]
    fn test_parse_rejects_other_routes() {
        for input in ["/", "/chat/tarot/1", "/admin/42", "/client", "https://x.example"] {
            assert!(input.parse::<PeerRoute>().is_err(), "{}", input);
        }
    }
}
