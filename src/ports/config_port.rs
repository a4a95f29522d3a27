//! Configuration access port trait.

/// Read-only key lookup by `[section] key`. Typed parsing and validation
/// happen in [`crate::domain::settings`].
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
