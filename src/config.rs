use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,
    /// Lifetime of issued tokens and of the `t` cookie, in seconds.
    pub token_ttl: u64,

    // Rate limiting
    pub rate_signin_per_min: u32,
    pub rate_register_per_min: u32,

    pub hr_routes_require_auth: bool,
    pub create_via_procedures: bool,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let user = lookup("DB_USER").context("DATABASE_URL or DB_USER must be set")?;
                let password = lookup("DB_PASSWORD").unwrap_or_default();
                let connect = lookup("DB_CONNECT_STRING")
                    .context("DATABASE_URL or DB_CONNECT_STRING must be set")?;
                format!("mysql://{}:{}@{}", user, password, connect)
            }
        };

        let server_addr = match lookup("SERVER_ADDR") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", parse_or(&lookup, "PORT", 3000u16)?),
        };

        Ok(Self {
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: lookup("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .context("JWT_SECRET must be set")?,
            server_addr,
            token_ttl: parse_or(&lookup, "TOKEN_TTL", 99_990)?,

            rate_signin_per_min: parse_or(&lookup, "RATE_SIGNIN_PER_MIN", 60)?,
            rate_register_per_min: parse_or(&lookup, "RATE_REGISTER_PER_MIN", 30)?,

            hr_routes_require_auth: parse_or(&lookup, "HR_ROUTES_REQUIRE_AUTH", false)?,
            create_via_procedures: parse_or(&lookup, "CREATE_VIA_PROCEDURES", true)?,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://hr:hr@localhost/hr".to_string(),
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            token_ttl: 99_990,
            rate_signin_per_min: 1000,
            rate_register_per_min: 1000,
            hr_routes_require_auth: false,
            create_via_procedures: true,
            log_dir: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "mysql://u:p@db/hr"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.token_ttl, 99_990);
        assert!(!config.hr_routes_require_auth);
        assert!(config.create_via_procedures);
        assert_eq!(config.log_dir, "logs");
    }

    #[test]
    fn database_url_is_composed_from_parts() {
        let config = Config::from_lookup(lookup_from(&[
            ("DB_USER", "hr"),
            ("DB_PASSWORD", "pw"),
            ("DB_CONNECT_STRING", "localhost:3306/hr"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "mysql://hr:pw@localhost:3306/hr");
        assert_eq!(config.server_addr, "0.0.0.0:8080");
    }

    #[test]
    fn missing_secret_and_bad_numbers_fail() {
        assert!(Config::from_lookup(lookup_from(&[("DATABASE_URL", "mysql://x")])).is_err());

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "mysql://x"),
            ("JWT_SECRET", "s"),
            ("TOKEN_TTL", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("TOKEN_TTL"));
    }
}
