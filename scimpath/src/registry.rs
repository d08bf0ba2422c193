//! Process-wide registration surface: construct, register the
//! schema/extension URNs a deployment recognises plus which one is each
//! resource type's primary schema, then compile paths/filters against it.
//!
//! Mirrors `diskplan_config::Config`'s two-phase lifecycle (construct, then
//! register) except there is no file format to load: registration here is
//! a handful of URN strings, not a `toml` document, so `Registry::new` takes
//! no path and there is no `load`.

use std::sync::{OnceLock, RwLock};

use scimpath_lang::Urn;

/// The URN trie plus, for the CRUD facade's namespace elision, the primary
/// schema URN of whatever resource type a caller is currently working with.
#[derive(Debug)]
pub struct Registry {
    urn: Urn,
    primary_schema: Option<String>,
}

impl Registry {
    /// An empty registry: no URNs registered, no primary schema set.
    pub fn new() -> Self {
        Registry {
            urn: Urn::new(),
            primary_schema: None,
        }
    }

    /// Registers a single URN (idempotent, case-insensitive; see [`Urn::register`]).
    pub fn register(&mut self, urn: &str) {
        self.urn.register(urn);
    }

    /// Registers every URN yielded by `urns`.
    pub fn register_many<I, S>(&mut self, urns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.urn.register_many(urns);
    }

    /// Registers `urn` (if not already present) and designates it the
    /// primary schema consulted by the CRUD facade's namespace elision: a
    /// path whose head segment names this URN has that head dropped, so the
    /// remainder addresses the resource's own attributes rather than an
    /// extension namespace keyed by the same string.
    pub fn set_primary_schema(&mut self, urn: impl Into<String>) {
        let urn = urn.into();
        self.urn.register(&urn);
        self.primary_schema = Some(urn);
    }

    /// The currently designated primary schema URN, if any.
    pub fn primary_schema(&self) -> Option<&str> {
        self.primary_schema.as_deref()
    }

    /// The underlying URN trie, for compiling against directly.
    pub fn urn(&self) -> &Urn {
        &self.urn
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

static DEFAULT: OnceLock<RwLock<Registry>> = OnceLock::new();

/// The lazily-initialised process-wide [`Registry`]. Shared process-wide
/// state is limited to this one value. Most callers should prefer threading
/// an explicit [`Registry`] through their own calls; this exists for callers
/// that need a single global instead.
pub fn global() -> &'static RwLock<Registry> {
    DEFAULT.get_or_init(|| RwLock::new(Registry::new()))
}
