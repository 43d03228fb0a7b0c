//! Configuration access port trait.
//!
//! Section and key lookups are case-insensitive.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Every section name, lowercased.
    fn sections(&self) -> Vec<String>;

    /// Every key present in `section`, lowercased; empty if the section is missing.
    fn keys(&self, section: &str) -> Vec<String>;
}
