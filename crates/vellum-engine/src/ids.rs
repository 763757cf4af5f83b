//! Embed id assignment.
//!
//! Every embed instance in a document needs its own id, even when the same
//! placeholder name appears several times. An [`IdAllocator`] lives for one
//! transformation (or one proposal, across its sections) and hands out ids
//! according to an [`IdStrategy`]:
//!
//! - **Timestamped**: `ph_<normalized-name>_<unix-millis>_<seq>`. Differs per
//!   invocation; `seq` keeps ids unique within the invocation.
//! - **Derived**: `ph_<uuid>` where the UUIDv5 is hashed from
//!   `(scope, name, occurrence)`. Same template, same ids, every time.
//!
//! A definition that carries its own id always wins: the first occurrence
//! uses it verbatim, later ones get `<id>-<n>`. No id is handed out twice; a
//! candidate that is already taken gets a further `-<n>` suffix.

use std::collections::{HashMap, HashSet};

/// Fixed namespace for deriving deterministic embed ids via UUIDv5.
const VELLUM_EMBED_NS: uuid::Uuid = uuid::uuid!("5d3f6a2e-8c41-4b7f-9e0a-2b6c1d8f4e73");

/// How to mint ids for embeds whose definition has none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Time-based, fresh per invocation.
    #[default]
    Timestamped,
    /// Deterministic from `(scope, name, occurrence)`. `scope` is usually
    /// [`Template::id_scope`](vellum_types::Template::id_scope).
    Derived { scope: String },
}

impl IdStrategy {
    pub fn derived(scope: impl Into<String>) -> Self {
        IdStrategy::Derived {
            scope: scope.into(),
        }
    }
}

/// Per-document id state.
#[derive(Debug)]
pub struct IdAllocator {
    strategy: IdStrategy,
    millis: u64,
    seq: u64,
    /// Occurrences seen so far, per placeholder name.
    occurrences: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl IdAllocator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            millis: vellum_types::now_millis(),
            seq: 0,
            occurrences: HashMap::new(),
            issued: HashSet::new(),
        }
    }

    pub fn strategy(&self) -> &IdStrategy {
        &self.strategy
    }

    /// Id for the next occurrence of `name`.
    ///
    /// `fixed` is the definition's own id, if it has one.
    pub fn next_id(&mut self, name: &str, fixed: Option<&str>) -> String {
        let slot = self.occurrences.entry(name.to_string()).or_insert(0);
        let occurrence = *slot;
        *slot += 1;

        let candidate = match (fixed.filter(|id| !id.is_empty()), &self.strategy) {
            (Some(id), _) if occurrence == 0 => id.to_string(),
            (Some(id), _) => format!("{id}-{occurrence}"),
            (None, IdStrategy::Timestamped) => {
                let seq = self.seq;
                self.seq += 1;
                format!("ph_{}_{}_{}", normalize_name(name), self.millis, seq)
            }
            (None, IdStrategy::Derived { scope }) => {
                let key = format!("{scope}\u{1f}{name}\u{1f}{occurrence}");
                let uuid = uuid::Uuid::new_v5(&VELLUM_EMBED_NS, key.as_bytes());
                format!("ph_{}", uuid.as_simple())
            }
        };
        self.claim(candidate)
    }

    /// Reserve `candidate`, or the first free `<candidate>-<n>`.
    fn claim(&mut self, candidate: String) -> String {
        if !self.issued.contains(&candidate) {
            self.issued.insert(candidate.clone());
            return candidate;
        }
        let mut n = 1;
        loop {
            let next = format!("{candidate}-{n}");
            if self.issued.insert(next.clone()) {
                tracing::debug!(%candidate, id = %next, "embed id already issued");
                return next;
            }
            n += 1;
        }
    }
}

/// Lowercase, with every run of non-word characters collapsed to `_`.
///
/// Word characters are ASCII letters, digits and `_`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Id for an embed created by a host without one: `<prefix>-<unix-millis>`.
pub fn creation_id(prefix: &str) -> String {
    format!("{prefix}-{}", vellum_types::now_millis())
}
