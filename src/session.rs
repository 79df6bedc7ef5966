// Per-session category hints.
//
// The UI pre-selects the category a user last browsed. That hint is
// best-effort: last write wins, and nothing reads it to decide a result.
// Requests without a session id simply don't record one.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::db::models::Category;

/// Caller-supplied context that travels with each request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub session: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_session(session: impl Into<String>) -> Self {
        let session = session.into();
        let session = session.trim();
        Self {
            session: (!session.is_empty()).then(|| session.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct CategoryHints {
    hints: RwLock<HashMap<String, Category>>,
}

impl CategoryHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the category for the request's session, if it has one.
    pub fn record(&self, ctx: &RequestContext, category: Category) {
        let Some(session) = ctx.session.as_deref() else {
            return;
        };
        // Poisoned locks are recovered, not propagated.
        let mut hints = self.hints.write().unwrap_or_else(|e| e.into_inner());
        hints.insert(session.to_string(), category);
    }

    pub fn get(&self, ctx: &RequestContext) -> Option<Category> {
        let session = ctx.session.as_deref()?;
        let hints = self.hints.read().unwrap_or_else(|e| e.into_inner());
        hints.get(session).copied()
    }

    pub fn len(&self) -> usize {
        self.hints.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
