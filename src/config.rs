//! Environment configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `CAREBOX_ADDR` | `0.0.0.0:8000` |
//! | `REDIS_URL` | unset → in-memory session cache |
//! | `TOKEN_SECRET` | required, at least 32 bytes |
//! | `ACCESS_TOKEN_TTL_SECS` | `900` |
//! | `SESSION_TTL_SECS` | `28800` (8 hours) |
//! | `BCRYPT_COST` | `bcrypt::DEFAULT_COST` |
//! | `CORS_ALLOW_ORIGIN` | `*` |
//! | `LOG_FORMAT` | `pretty` (`json` for production) |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;
use crate::observability::LogFormat;

const DEFAULT_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 900;
const DEFAULT_SESSION_TTL_SECS: u64 = 28_800;
const MIN_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub redis_url: Option<String>,
    pub token_secret: String,
    pub access_token_ttl: Duration,
    pub session_ttl: Duration,
    pub bcrypt_cost: u32,
    pub cors_allow_origin: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        // A missing .env file is the normal case outside local development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let token_secret = lookup("TOKEN_SECRET")
            .ok_or_else(|| Error::Config("TOKEN_SECRET is required".into()))?;
        if token_secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "TOKEN_SECRET must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(Error::Config(format!("BCRYPT_COST must be in 4..=31, got {bcrypt_cost}")));
        }

        Ok(Self {
            addr: parse_or(&lookup, "CAREBOX_ADDR", parse_default(DEFAULT_ADDR)?)?,
            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),
            token_secret,
            access_token_ttl: Duration::from_secs(parse_or(
                &lookup,
                "ACCESS_TOKEN_TTL_SECS",
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?),
            session_ttl: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL_SECS,
            )?),
            bcrypt_cost,
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN").unwrap_or_else(|| "*".into()),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        })
    }
}

fn parse_default<T: FromStr>(raw: &str) -> Result<T, Error> {
    raw.parse()
        .map_err(|_| Error::Config(format!("invalid built-in default `{raw}`")))
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, Error> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} has an invalid value `{raw}`"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = load(&[("TOKEN_SECRET", SECRET)]).unwrap();

        assert_eq!(config.addr, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.redis_url, None);
        assert_eq!(config.access_token_ttl, Duration::from_secs(900));
        assert_eq!(config.session_ttl, Duration::from_secs(28_800));
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.cors_allow_origin, "*");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            ("TOKEN_SECRET", SECRET),
            ("CAREBOX_ADDR", "127.0.0.1:9000"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("SESSION_TTL_SECS", "60"),
            ("BCRYPT_COST", "4"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_or_short_secret_is_an_error() {
        assert!(matches!(load(&[]), Err(Error::Config(_))));
        assert!(matches!(load(&[("TOKEN_SECRET", "short")]), Err(Error::Config(_))));
    }

    #[test]
    fn unparsable_values_are_errors() {
        assert!(matches!(
            load(&[("TOKEN_SECRET", SECRET), ("SESSION_TTL_SECS", "soon")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            load(&[("TOKEN_SECRET", SECRET), ("BCRYPT_COST", "2")]),
            Err(Error::Config(_))
        ));
    }
}
