//! Trigger events and the filter deciding whether a run activates.
//!
//! The pipeline activates on a pushed tag matching the configured glob, or
//! on a manual dispatch. Every other event is ignored.

use crate::error::{Result, TriggerError};
use serde::{Deserialize, Serialize};
use std::fmt;

const TAG_PREFIX: &str = "refs/tags/";
const BRANCH_PREFIX: &str = "refs/heads/";

/// Event that started a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerEvent {
    /// A tag was pushed
    TagPush {
        /// Tag name without the `refs/tags/` prefix
        tag: String,
    },
    /// Operator-initiated run
    ManualDispatch {
        /// Ref the dispatch ran on, if known
        reference: Option<String>,
    },
    /// Anything else (branch push, pull request, schedule, ...)
    Other {
        /// Event name as reported by the CI system
        event: String,
        /// Ref the event carried
        reference: Option<String>,
    },
}

impl TriggerEvent {
    /// Classify an event name and ref.
    ///
    /// A `push` whose ref is a tag (`refs/tags/<name>`) becomes a
    /// [`TriggerEvent::TagPush`]. A bare ref with no `refs/` prefix is read
    /// as a tag name. `workflow_dispatch` (or `manual`) becomes a
    /// [`TriggerEvent::ManualDispatch`].
    pub fn from_ref(event_name: &str, reference: Option<&str>) -> Self {
        let reference = reference.map(str::trim).filter(|r| !r.is_empty());

        match event_name {
            "workflow_dispatch" | "manual" => Self::ManualDispatch {
                reference: reference.map(str::to_string),
            },
            "push" => match reference {
                Some(r) if r.starts_with(TAG_PREFIX) => Self::TagPush {
                    tag: r[TAG_PREFIX.len()..].to_string(),
                },
                Some(r) if !r.starts_with("refs/") => Self::TagPush { tag: r.to_string() },
                _ => Self::Other {
                    event: event_name.to_string(),
                    reference: reference.map(str::to_string),
                },
            },
            _ => Self::Other {
                event: event_name.to_string(),
                reference: reference.map(str::to_string),
            },
        }
    }

    /// Build the event from the GitHub Actions environment
    pub fn from_github_env() -> Result<Self> {
        Self::from_env_lookup(|name| std::env::var(name).ok())
    }

    /// Build the event through a variable lookup function
    pub fn from_env_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let event = lookup("GITHUB_EVENT_NAME").ok_or_else(|| TriggerError::MissingEnvironment {
            name: "GITHUB_EVENT_NAME".to_string(),
        })?;
        let reference = lookup("GITHUB_REF");
        Ok(Self::from_ref(&event, reference.as_deref()))
    }

    /// CI event name this trigger corresponds to
    pub fn event_name(&self) -> &str {
        match self {
            Self::TagPush { .. } => "push",
            Self::ManualDispatch { .. } => "workflow_dispatch",
            Self::Other { event, .. } => event,
        }
    }

    /// Ref to check out for this event, if any
    pub fn checkout_ref(&self) -> Option<String> {
        match self {
            Self::TagPush { tag } => Some(tag.clone()),
            Self::ManualDispatch { reference } | Self::Other { reference, .. } => {
                reference.as_deref().map(short_ref)
            }
        }
    }

    /// Tag the release is published on.
    ///
    /// A tag push publishes on its tag. A manual dispatch uses the
    /// `explicit` tag, else the tag it was dispatched on.
    pub fn release_tag(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(tag) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
            return Ok(tag.to_string());
        }
        match self {
            Self::TagPush { tag } => Ok(tag.clone()),
            Self::ManualDispatch {
                reference: Some(r),
            } if r.starts_with(TAG_PREFIX) => Ok(r[TAG_PREFIX.len()..].to_string()),
            other => Err(TriggerError::MissingTag {
                event: other.event_name().to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TagPush { tag } => write!(f, "tag push {tag}"),
            Self::ManualDispatch { reference: Some(r) } => write!(f, "manual dispatch on {r}"),
            Self::ManualDispatch { reference: None } => write!(f, "manual dispatch"),
            Self::Other {
                event,
                reference: Some(r),
            } => write!(f, "{event} on {r}"),
            Self::Other {
                event,
                reference: None,
            } => write!(f, "{event}"),
        }
    }
}

fn short_ref(reference: &str) -> String {
    reference
        .strip_prefix(TAG_PREFIX)
        .or_else(|| reference.strip_prefix(BRANCH_PREFIX))
        .unwrap_or(reference)
        .to_string()
}

/// Decides whether an event activates the pipeline
#[derive(Debug, Clone)]
pub struct TriggerFilter {
    pattern: glob::Pattern,
}

impl TriggerFilter {
    /// Compile a tag glob such as `v*`
    pub fn new(tag_pattern: &str) -> Result<Self> {
        let pattern = glob::Pattern::new(tag_pattern).map_err(|e| TriggerError::InvalidPattern {
            pattern: tag_pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// Whether a tag name matches the pattern; `*` does not cross `/`
    pub fn matches_tag(&self, tag: &str) -> bool {
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.pattern.matches_with(tag, options)
    }

    /// Whether the event activates the pipeline
    pub fn activates(&self, event: &TriggerEvent) -> bool {
        match event {
            TriggerEvent::ManualDispatch { .. } => true,
            TriggerEvent::TagPush { tag } => self.matches_tag(tag),
            TriggerEvent::Other { .. } => false,
        }
    }

    /// Source pattern
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}
