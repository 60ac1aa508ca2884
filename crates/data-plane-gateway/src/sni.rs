//! Parsing of proxy-subdomain SNIs.
//!
//! The label before the gateway hostname is dash-separated and takes one of
//! two forms:
//!
//!   `<task-host>-<port>`
//!   `<task-host>-<key-begin>-<rclock-begin>-<port>`
//!
//! where the optional key-begin / rclock-begin pair selects a specific shard
//! split, and is passed through opaquely as label values.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("sni does not have enough components")]
    MissingDomain,
    #[error("sni does not match the gateway domain suffix")]
    WrongDomain,
    #[error("sni contains an empty label")]
    EmptyLabel,
    #[error("invalid proxy subdomain")]
    InvalidSubdomain,
    #[error("invalid subdomain port number: {0:?}")]
    InvalidPort(String),
}

/// A parsed shard query, extracted from a proxy-subdomain SNI.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardQuery {
    /// Hostname of the task, as labeled on its shards.
    pub hostname: String,
    /// Key-begin of a specific shard split, or empty.
    /// Kept as an opaque string, since it's only used as a label value.
    pub key_begin: String,
    /// R-clock begin of a specific shard split, or empty.
    pub r_clock_begin: String,
    /// Container port to which the connection is directed.
    pub port: u16,
}

/// Parse an SNI into its ShardQuery, verifying it against the gateway
/// hostname.
pub fn parse_server_name(sni: &str, gateway_hostname: &str) -> Result<ShardQuery, ParseError> {
    let (subdomain, domain) = sni.split_once('.').ok_or(ParseError::MissingDomain)?;

    if domain != gateway_hostname {
        return Err(ParseError::WrongDomain);
    }
    if subdomain.is_empty() {
        return Err(ParseError::EmptyLabel);
    }

    let parts: Vec<&str> = subdomain.split('-').collect();
    let (hostname, key_begin, r_clock_begin, port) = match parts.as_slice() {
        [hostname, port] => (*hostname, "", "", *port),
        [hostname, key_begin, r_clock_begin, port] => (*hostname, *key_begin, *r_clock_begin, *port),
        _ => return Err(ParseError::InvalidSubdomain),
    };

    let port = match port.parse::<u16>() {
        Ok(port) if port != 0 => port,
        _ => return Err(ParseError::InvalidPort(port.to_string())),
    };

    Ok(ShardQuery {
        hostname: hostname.to_string(),
        key_begin: key_begin.to_string(),
        r_clock_begin: r_clock_begin.to_string(),
        port,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const HOST: &str = "gw.example";

    #[test]
    fn test_two_component_form() {
        assert_eq!(
            parse_server_name("task1-6000.gw.example", HOST).unwrap(),
            ShardQuery {
                hostname: "task1".to_string(),
                key_begin: String::new(),
                r_clock_begin: String::new(),
                port: 6000,
            },
        );
    }

    #[test]
    fn test_four_component_form() {
        assert_eq!(
            parse_server_name("task1-00000000-80000000-8080.gw.example", HOST).unwrap(),
            ShardQuery {
                hostname: "task1".to_string(),
                key_begin: "00000000".to_string(),
                r_clock_begin: "80000000".to_string(),
                port: 8080,
            },
        );
    }

    #[test]
    fn test_round_trip_recovers_fields() {
        for (task, kb, rc, port) in [
            ("taskhost", "", "", 443u16),
            ("t", "aaaaaaaa", "bbbbbbbb", 65535),
        ] {
            let subdomain = if kb.is_empty() {
                format!("{task}-{port}")
            } else {
                format!("{task}-{kb}-{rc}-{port}")
            };
            let query = parse_server_name(&format!("{subdomain}.{HOST}"), HOST).unwrap();
            assert_eq!(
                (query.hostname.as_str(), query.key_begin.as_str(), query.r_clock_begin.as_str(), query.port),
                (task, kb, rc, port),
            );
        }
    }

    #[test]
    fn test_rejections() {
        // Wrong number of dash components.
        for sni in [
            "task1.gw.example",
            "task1-a-6000.gw.example",
            "task1-a-b-c-6000.gw.example",
        ] {
            assert_eq!(
                parse_server_name(sni, HOST),
                Err(ParseError::InvalidSubdomain),
            );
        }

        // Port bounds.
        assert_eq!(
            parse_server_name("task1-0.gw.example", HOST),
            Err(ParseError::InvalidPort("0".to_string())),
        );
        assert_eq!(
            parse_server_name("task1-65536.gw.example", HOST),
            Err(ParseError::InvalidPort("65536".to_string())),
        );
        assert_eq!(
            parse_server_name("task1-http.gw.example", HOST),
            Err(ParseError::InvalidPort("http".to_string())),
        );

        // Suffix must match the gateway hostname exactly.
        assert_eq!(
            parse_server_name("task1-6000.other.example", HOST),
            Err(ParseError::WrongDomain),
        );
        // The split is at the *first* dot, so a nested subdomain is a
        // domain mismatch rather than a parse of the outer label.
        assert_eq!(
            parse_server_name("task1-6000.extra.gw.example", HOST),
            Err(ParseError::WrongDomain),
        );

        // Degenerate SNIs.
        assert_eq!(parse_server_name("gw", HOST), Err(ParseError::MissingDomain));
        assert_eq!(
            parse_server_name(".gw.example", HOST),
            Err(ParseError::EmptyLabel),
        );
    }
}
