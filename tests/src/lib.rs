//! Integration tests for the collection engine.
//!
//! [`support`] holds in-memory stand-ins for every port so whole runs can be
//! exercised without a fleet: a scripted remote shell, a scripted liveness probe,
//! an in-memory trust store and fixed or failing inventories.
