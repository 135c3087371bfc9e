use std::net::SocketAddr;
use std::path::PathBuf;

use rand::Rng;

pub const DB_FILE_NAME: &str = "gitmessages.db";
pub const RANDOM_PORT_RANGE: std::ops::RangeInclusive<u16> = 64000..=64999;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub address: String,
    pub port: Option<u16>,
    pub data_dir: PathBuf,
    /// External pool definition; the bundled pool is used when unset.
    pub messages_file: Option<PathBuf>,
    /// When set, `POST /api/v1/reset` requires `Authorization: Bearer <token>`.
    pub admin_token: Option<String>,
    pub dev: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: None,
            data_dir: PathBuf::from("./data"),
            messages_file: None,
            admin_token: None,
            dev: false,
        }
    }
}

impl ServerConfig {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Configured port, or a random one from the unprivileged high range.
    pub fn resolve_port(&self) -> u16 {
        self.port
            .unwrap_or_else(|| rand::rng().random_range(RANDOM_PORT_RANGE))
    }

    pub fn listen_addr(&self, port: u16) -> Result<SocketAddr, String> {
        format!("{}:{}", self.address, port)
            .parse::<SocketAddr>()
            .map_err(|err| format!("invalid listen address {}:{}: {}", self.address, port, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.address, "0.0.0.0");
        assert_eq!(cfg.db_path(), PathBuf::from("./data").join("gitmessages.db"));
        assert!(cfg.admin_token.is_none());
    }

    #[test]
    fn test_resolve_port_prefers_configured() {
        let cfg = ServerConfig {
            port: Some(8080),
            ..ServerConfig::default()
        };
        assert_eq!(cfg.resolve_port(), 8080);
    }

    #[test]
    fn test_random_port_in_range() {
        let cfg = ServerConfig::default();
        for _ in 0..20 {
            assert!(RANDOM_PORT_RANGE.contains(&cfg.resolve_port()));
        }
    }

    #[test]
    fn test_listen_addr() {
        let cfg = ServerConfig {
            address: "127.0.0.1".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(cfg.listen_addr(3000).unwrap().port(), 3000);

        let bad = ServerConfig {
            address: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.listen_addr(3000).is_err());
    }
}
