//! Eviction policy cores. Each core is single-threaded; synchronization lives
//! in the public wrappers.

pub mod lru;
