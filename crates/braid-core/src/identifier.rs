//! Identifier management using string interning.
//!
//! Layout graphs are rebuilt from scratch on every data change, and node
//! ids get compared and hashed constantly (parent lookups, link
//! resolution). Interning turns those into symbol comparisons.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> &'static Mutex<DefaultStringInterner> {
    INTERNER.get_or_init(|| Mutex::new(DefaultStringInterner::new()))
}

/// Interned identifier for a node in the layout graph.
///
/// Copyable, cheap to compare, and stable for the lifetime of the
/// process. Identifiers with the same text are the same `Id`.
///
/// # Examples
///
/// ```
/// use braid_core::identifier::Id;
///
/// let stream = Id::new("literature");
/// let node = Id::timed("literature", 1903);
/// assert_eq!(node, "literature@1903");
/// assert_ne!(stream, node);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its string representation.
    pub fn new(name: &str) -> Self {
        let mut interner = interner().lock().expect("Failed to acquire interner lock");
        Self(interner.get_or_intern(name))
    }

    /// Creates the `Id` of a per-time-unit node: `name@time`.
    ///
    /// Stream and tag nodes exist once per discrete time unit; this is
    /// the canonical spelling of their identifiers.
    pub fn timed(name: &str, time: i32) -> Self {
        Self::new(&format!("{name}@{time}"))
    }

    /// Creates a derived `Id` by appending `::suffix`.
    ///
    /// Used for synthesized helper nodes such as link ports.
    pub fn suffixed(&self, suffix: &str) -> Self {
        let derived = {
            let interner = interner().lock().expect("Failed to acquire interner lock");
            let base = interner
                .resolve(self.0)
                .expect("Symbol should exist in interner");
            format!("{base}::{suffix}")
        };
        Self::new(&derived)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner().lock().expect("Failed to acquire interner lock");
        let text = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{text}")
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "stream@3"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner().lock().expect("Failed to acquire interner lock");
        let text = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        text == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
