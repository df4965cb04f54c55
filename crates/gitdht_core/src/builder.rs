//! Database construction.

use crate::config::Config;
use crate::database::Database;
use crate::error::{DhtResult, Error};
use gitdht_store::ColumnStore;
use std::sync::Arc;
use tokio::runtime::{Builder as RuntimeBuilder, Handle};

/// Default client port when the connection URI names none.
const DEFAULT_PORT: u16 = 9160;

/// Builds a [`Database`] from a store client and connection settings.
///
/// Connection addressing can be supplied piecewise through the setters or
/// all at once through [`set_uri`](Self::set_uri) with a URI of the form
///
/// ```text
/// git+cassandra://host:port/cluster/keyspace/repository
/// ```
///
/// where the port and the trailing repository path are optional. The store
/// client itself is always supplied explicitly via
/// [`store`](Self::store) — the builder holds addressing metadata but
/// never dials the network.
#[derive(Default)]
pub struct DatabaseBuilder {
    hosts: Vec<String>,
    cluster_name: Option<String>,
    keyspace_name: Option<String>,
    repository_name: Option<String>,
    store: Option<Arc<dyn ColumnStore>>,
    handle: Option<Handle>,
    config: Config,
}

impl DatabaseBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one `host:port` contact point.
    #[must_use]
    pub fn add_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }

    /// Sets the cluster name.
    #[must_use]
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Sets the keyspace name.
    #[must_use]
    pub fn keyspace_name(mut self, name: impl Into<String>) -> Self {
        self.keyspace_name = Some(name.into());
        self
    }

    /// Sets the store client the database operates on.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn ColumnStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Runs network operations on an existing runtime instead of creating
    /// a dedicated pool. [`Database::shutdown`] leaves such a runtime
    /// untouched.
    #[must_use]
    pub fn runtime_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Parses a `git+<store>://` connection URI into the builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUri`] when the scheme is missing, the path
    /// names no cluster or keyspace, or the port does not parse.
    pub fn set_uri(mut self, uri: &str) -> DhtResult<Self> {
        let rest = uri
            .strip_prefix("git+")
            .and_then(|r| r.split_once("://"))
            .ok_or_else(|| Error::invalid_uri(format!("expected git+<store>://, got {uri:?}")))?
            .1;

        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, path),
            None => (rest, ""),
        };

        if !authority.is_empty() {
            let host = match authority.split_once(':') {
                Some((host, port)) => {
                    let port: u16 = port.parse().map_err(|_| {
                        Error::invalid_uri(format!("port {port:?} is not a number"))
                    })?;
                    format!("{host}:{port}")
                }
                None => format!("{authority}:{DEFAULT_PORT}"),
            };
            self.hosts.push(host);
        }

        let mut segments = path.splitn(3, '/');
        let cluster = segments.next().filter(|s| !s.is_empty());
        let keyspace = segments.next().filter(|s| !s.is_empty());
        let repository = segments.next().filter(|s| !s.is_empty());

        match (cluster, keyspace) {
            (Some(cluster), Some(keyspace)) => {
                self.cluster_name = Some(cluster.to_owned());
                self.keyspace_name = Some(keyspace.to_owned());
            }
            _ => {
                return Err(Error::invalid_uri(
                    "path must name a cluster and a keyspace",
                ));
            }
        }
        if let Some(repository) = repository {
            self.repository_name = Some(repository.to_owned());
        }
        Ok(self)
    }

    /// The configured contact points.
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// The configured cluster name, if any.
    #[must_use]
    pub fn get_cluster_name(&self) -> Option<&str> {
        self.cluster_name.as_deref()
    }

    /// The configured keyspace name, if any.
    #[must_use]
    pub fn get_keyspace_name(&self) -> Option<&str> {
        self.keyspace_name.as_deref()
    }

    /// The repository path carried by the connection URI, if any.
    #[must_use]
    pub fn get_repository_name(&self) -> Option<&str> {
        self.repository_name.as_deref()
    }

    /// Opens the database.
    ///
    /// When no runtime handle was supplied, a dedicated multi-threaded
    /// pool of [`Config::worker_threads`] threads is created and owned by
    /// the database; [`Database::shutdown`] stops it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when no store client was
    /// supplied, and [`Error::TaskFailed`] when the worker pool cannot be
    /// created.
    pub fn build(self) -> DhtResult<Database> {
        let store = self
            .store
            .ok_or_else(|| Error::invalid_argument("a store client is required"))?;

        let (handle, owned_runtime) = match self.handle {
            Some(handle) => (handle, None),
            None => {
                let runtime = RuntimeBuilder::new_multi_thread()
                    .worker_threads(self.config.worker_threads)
                    .thread_name("gitdht-worker")
                    .enable_all()
                    .build()
                    .map_err(|err| {
                        Error::task_failed(format!("failed to create worker pool: {err}"))
                    })?;
                (runtime.handle().clone(), Some(runtime))
            }
        };

        Ok(Database::new(store, handle, owned_runtime, self.config))
    }
}

impl std::fmt::Debug for DatabaseBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseBuilder")
            .field("hosts", &self.hosts)
            .field("cluster_name", &self.cluster_name)
            .field("keyspace_name", &self.keyspace_name)
            .field("repository_name", &self.repository_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitdht_store::MemoryStore;

    #[test]
    fn parses_full_uri() {
        let builder = DatabaseBuilder::new()
            .set_uri("git+cassandra://db.example.com:9170/Main/GitStore/projects/gitdht.git")
            .unwrap();
        assert_eq!(builder.hosts(), ["db.example.com:9170"]);
        assert_eq!(builder.get_cluster_name(), Some("Main"));
        assert_eq!(builder.get_keyspace_name(), Some("GitStore"));
        assert_eq!(builder.get_repository_name(), Some("projects/gitdht.git"));
    }

    #[test]
    fn missing_port_defaults() {
        let builder = DatabaseBuilder::new()
            .set_uri("git+cassandra://db.example.com/Main/GitStore")
            .unwrap();
        assert_eq!(builder.hosts(), ["db.example.com:9160"]);
        assert_eq!(builder.get_repository_name(), None);
    }

    #[test]
    fn host_is_optional() {
        let builder = DatabaseBuilder::new()
            .set_uri("git+cassandra:///Main/GitStore")
            .unwrap();
        assert!(builder.hosts().is_empty());
        assert_eq!(builder.get_cluster_name(), Some("Main"));
    }

    #[test]
    fn rejects_malformed_uris() {
        assert!(DatabaseBuilder::new().set_uri("http://x/Main/Ks").is_err());
        assert!(DatabaseBuilder::new().set_uri("git+cassandra://h").is_err());
        assert!(DatabaseBuilder::new()
            .set_uri("git+cassandra://h/OnlyCluster")
            .is_err());
        assert!(DatabaseBuilder::new()
            .set_uri("git+cassandra://h:notaport/Main/Ks")
            .is_err());
    }

    #[test]
    fn build_requires_a_store() {
        let err = DatabaseBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn build_with_borrowed_runtime() {
        let db = DatabaseBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .runtime_handle(Handle::current())
            .build()
            .unwrap();
        // Shutdown is a no-op on a borrowed runtime.
        db.shutdown();
    }

    #[test]
    fn build_with_owned_pool() {
        let db = DatabaseBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .config(Config::new().worker_threads(2))
            .build()
            .unwrap();
        db.shutdown();
    }
}
