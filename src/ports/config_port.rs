//! Configuration access port trait.
//!
//! Lookups are by INI section and key. Typed values are read as strings and
//! parsed by the caller, so a malformed value can be reported instead of
//! silently defaulted. `get_bool` falls back to `default` when the key is
//! missing or unrecognised.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
