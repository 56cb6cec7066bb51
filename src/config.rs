use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sled,
    Memory,
}

/// Process configuration, read from the environment (and `.env`, loaded by
/// `main` before this runs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Missing means the store cannot be opened; the server still starts.
    pub database_path: Option<PathBuf>,
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreKind,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let database_path = lookup("DATABASE_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        let host = parse_or(lookup("HOST"), "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = parse_or(lookup("PORT"), "PORT", DEFAULT_PORT);
        let store = match lookup("TODO_STORE").as_deref() {
            None | Some("sled") => StoreKind::Sled,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                tracing::warn!("unknown TODO_STORE {:?}, using sled", other);
                StoreKind::Sled
            }
        };
        Self {
            database_path,
            host,
            port,
            store,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr + std::fmt::Display>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("invalid {} {:?}, using {}", key, raw, default);
            default
        }
    }
}
