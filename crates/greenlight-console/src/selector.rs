//! Entity selection state for the step editor.
//!
//! Covers the three selector concerns: merging a new multi-select value
//! into the current selection, sequencing debounced remote searches so a
//! slow stale response can never overwrite a newer one, and materializing
//! previously persisted ids into display objects when a step is opened
//! for editing.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

use greenlight_client::{ClientResult, RoleDirectory, UserDirectory};
use greenlight_model::{RoleSummary, UserSummary};

/// Delay applied to search input before a remote query is issued, in
/// milliseconds.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Net effect of applying a new selector value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// An ordered, de-duplicated set of selected entity ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySelection {
    ids: Vec<String>,
}

impl EntitySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for id in ids {
            let id = id.into();
            if !selection.ids.contains(&id) {
                selection.ids.push(id);
            }
        }
        selection
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Replace the selection with a new multi-select value, de-duplicated
    /// by id, and report what changed. Callers propagate non-empty changes
    /// to the owning step on every application, not only on save.
    pub fn apply(&mut self, selected: &[String]) -> SelectionChange {
        let next = Self::from_ids(selected.iter().cloned());

        let added = next
            .ids
            .iter()
            .filter(|id| !self.ids.contains(id))
            .cloned()
            .collect();
        let removed = self
            .ids
            .iter()
            .filter(|id| !next.ids.contains(id))
            .cloned()
            .collect();

        self.ids = next.ids;

        SelectionChange { added, removed }
    }
}

/// Monotonic sequence guard for debounced searches.
///
/// Each issued request takes a token; a response is applied only when its
/// token is still the latest issued one, so results from a slower, older
/// request are discarded.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    issued: AtomicU64,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for a new request.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a response carrying `token` may be applied.
    pub fn accept(&self, token: u64) -> bool {
        token == self.issued.load(Ordering::SeqCst)
    }
}

/// Result of materializing persisted ids into display objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSelection<T> {
    pub resolved: Vec<T>,
    /// Ids the directory could not resolve. Reported, never silently
    /// dropped.
    pub unresolved: Vec<String>,
}

impl<T> Default for ResolvedSelection<T> {
    fn default() -> Self {
        Self {
            resolved: Vec::new(),
            unresolved: Vec::new(),
        }
    }
}

/// Materialize a step's persisted role ids against the loaded page,
/// fetching by id anything the page does not contain.
pub async fn resolve_preselected_roles(
    ids: &[String],
    loaded: &[RoleSummary],
    directory: &dyn RoleDirectory,
) -> ResolvedSelection<RoleSummary> {
    let mut result = ResolvedSelection::default();

    for id in ids {
        if let Some(role) = loaded.iter().find(|role| &role.id == id) {
            result.resolved.push(role.clone());
            continue;
        }

        match directory.get_role(id).await {
            Ok(role) => result.resolved.push(role),
            Err(err) => {
                warn!(%id, %err, "Could not resolve pre-selected role");
                result.unresolved.push(id.clone());
            }
        }
    }

    result
}

/// Materialize a step's persisted user ids, with the same fetch-by-id
/// fallback as roles.
pub async fn resolve_preselected_users(
    ids: &[String],
    loaded: &[UserSummary],
    directory: &dyn UserDirectory,
) -> ResolvedSelection<UserSummary> {
    let mut result = ResolvedSelection::default();

    for id in ids {
        if let Some(user) = loaded.iter().find(|user| &user.id == id) {
            result.resolved.push(user.clone());
            continue;
        }

        match directory.get_user(id).await {
            Ok(user) => result.resolved.push(user),
            Err(err) => {
                warn!(%id, %err, "Could not resolve pre-selected user");
                result.unresolved.push(id.clone());
            }
        }
    }

    result
}

/// Run a debounced search against the role directory, honoring the
/// sequencer: returns `None` when a newer request was issued while this
/// one was in flight.
pub async fn sequenced_role_search(
    sequencer: &SearchSequencer,
    directory: &dyn RoleDirectory,
    query: &str,
    audience: Option<greenlight_model::RoleAudience>,
) -> ClientResult<Option<Vec<RoleSummary>>> {
    let token = sequencer.begin();
    let roles = directory.search_roles(query, audience).await?;

    if !sequencer.accept(token) {
        return Ok(None);
    }
    Ok(Some(roles))
}
