use homescout_core::ScoutError;

pub type TurnResult<T> = std::result::Result<T, TurnError>;

/// Why a turn failed. Every failure is turn-scoped: history committed before
/// the failure is kept and the router accepts the next turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("routing exhausted after {max_hops} hops without completing the turn")]
    RoutingExhausted { max_hops: usize },

    #[error("role '{role}' failed: {source}")]
    RoleExecutionFault {
        role: String,
        #[source]
        source: ScoutError,
    },

    #[error("role '{from}' may not hand off to '{to}'")]
    InvalidHandoffTarget { from: String, to: String },

    #[error("turn cancelled")]
    Cancelled,
}

impl TurnError {
    pub(crate) fn fault(role: impl Into<String>, source: ScoutError) -> Self {
        TurnError::RoleExecutionFault { role: role.into(), source }
    }

    /// Role the failure is attributed to, if any.
    pub fn role(&self) -> Option<&str> {
        match self {
            TurnError::RoleExecutionFault { role, .. } => Some(role),
            TurnError::InvalidHandoffTarget { from, .. } => Some(from),
            TurnError::RoutingExhausted { .. } | TurnError::Cancelled => None,
        }
    }
}
