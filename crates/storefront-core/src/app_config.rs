use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which backend holds products, reviews and orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatastoreKind {
    Firestore {
        project_id: String,
        base_url: String,
        access_token: Option<String>,
    },
    Postgres {
        database_url: String,
    },
    Memory,
}

impl DatastoreKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DatastoreKind::Firestore { .. } => "firestore",
            DatastoreKind::Postgres { .. } => "postgres",
            DatastoreKind::Memory => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub api_key_hash_salt: String,
    pub admin_api_keys: Vec<String>,
    pub datastore: DatastoreKind,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub product_api_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub supplemental_products_path: Option<PathBuf>,
    pub new_releases_count: usize,
    pub deals_count: usize,
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub public_url: String,
    pub currency: String,
    pub shipping_countries: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_key_hash_salt", &"[redacted]")
            .field("admin_api_keys", &format!("[{} redacted]", self.admin_api_keys.len()))
            .field("datastore", &self.datastore.name())
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("product_api_url", &self.product_api_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "supplemental_products_path",
                &self.supplemental_products_path,
            )
            .field("new_releases_count", &self.new_releases_count)
            .field("deals_count", &self.deals_count)
            .field(
                "stripe_secret_key",
                &self.stripe_secret_key.as_ref().map(|_| "[redacted]"),
            )
            .field("stripe_api_base", &self.stripe_api_base)
            .field("public_url", &self.public_url)
            .field("currency", &self.currency)
            .field("shipping_countries", &self.shipping_countries)
            .finish()
    }
}
