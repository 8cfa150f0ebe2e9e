use serde::{Deserialize, Serialize};

/// Connection settings for the backing PostgreSQL instance.
///
/// Constructed once at startup and passed into the collaborator that opens the
/// pool; the engine itself never reads configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "postgres".to_string(),
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    /// Reads `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_USER`,
    /// `POSTGRES_PASSWORD` and `POSTGRES_DB`, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("POSTGRES_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("POSTGRES_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                config.port = p;
            }
        }
        if let Ok(user) = std::env::var("POSTGRES_USER") {
            config.user = user;
        }
        if let Ok(password) = std::env::var("POSTGRES_PASSWORD") {
            config.password = password;
        }
        if let Ok(dbname) = std::env::var("POSTGRES_DB") {
            config.dbname = dbname;
        }
        config
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.dbname
        )
    }
}

/// Bind settings for the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Reads `API_PORT` and `API_BIND_ADDRESS`, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(port) = std::env::var("API_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                config.port = p;
            }
        }
        if let Ok(addr) = std::env::var("API_BIND_ADDRESS") {
            config.bind_address = addr;
        }
        config
    }
}
