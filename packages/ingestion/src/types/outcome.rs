//! Result of a best-effort call.

/// Either the full value, or a usable fallback plus the reason it degraded.
///
/// Best-effort stages (reel fetch, entity extraction, persona) return this
/// instead of an error so the caller branches on degradation explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Degraded { partial: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn degraded(partial: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            partial,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Degradation reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Ok(value) => value,
            Self::Degraded { partial, .. } => partial,
        }
    }

    /// The value, whether complete or partial.
    pub fn into_inner(self) -> T {
        match self {
            Self::Ok(value) => value,
            Self::Degraded { partial, .. } => partial,
        }
    }
}
