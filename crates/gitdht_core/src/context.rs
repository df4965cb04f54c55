//! Operation contexts.

/// The class of one logical operation, selecting the consistency policy
/// and failover behavior the router applies to it.
///
/// A context is a property of the call, not of the data; it carries no
/// persisted state. The set is closed and exhaustively matched — adding a
/// context is a compile-time-checked change, not a default-case fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Latency-sensitive lookup that tolerates a stale negative, e.g.
    /// "does this object exist". Single-replica reads, fail fast.
    FastMissingOk,
    /// Read that must observe recent local writes, e.g. metadata and ref
    /// lookups. Quorum within the nearest replica set when the deployment
    /// is locality-aware, general quorum otherwise.
    Local,
    /// Correctness-sensitive read or write. Full quorum; reads are
    /// reconciled and repaired across replicas by the store.
    ReadRepair,
}
