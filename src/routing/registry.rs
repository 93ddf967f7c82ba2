//! Rule storage and lookup.
//!
//! # Responsibilities
//! - Store registered rules in insertion order
//! - Look up the first rule matching a request's method and URL
//! - Keep the log of requests that matched no rule
//!
//! # Design Decisions
//! - Rules are never removed individually; the registry lives as long as the
//!   session
//! - Lookup is an O(n) scan (acceptable for typical rule counts)

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::http::InterceptedRequest;
use crate::intercept::rule::Rule;
use crate::routing::matcher::Params;

/// A rule selected for a request, with its extracted params.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule: Arc<Rule>,
    pub path: String,
    pub params: Params,
}

/// Ordered rule collection plus the unhandled-request log.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: RwLock<Vec<Arc<Rule>>>,
    unhandled: Mutex<Vec<InterceptedRequest>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Earlier rules take precedence.
    pub fn insert(&self, rule: Arc<Rule>) {
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(rule);
    }

    /// First rule whose method and pattern both match.
    pub fn find(&self, method: &str, url: &str) -> Option<RuleMatch> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        rules.iter().find_map(|rule| {
            if !rule.method().matches(method) {
                return None;
            }
            rule.pattern().matches(url).map(|found| RuleMatch {
                rule: rule.clone(),
                path: found.path,
                params: found.params,
            })
        })
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when no rule has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a request that matched no rule.
    pub fn record_unhandled(&self, request: InterceptedRequest) {
        self.unhandled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }

    /// Requests that matched no rule, oldest first.
    pub fn unhandled_requests(&self) -> Vec<InterceptedRequest> {
        self.unhandled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
