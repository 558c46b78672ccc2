/// Lifecycle of a crawl session
///
/// ```text
/// Idle -> Seeding -> Running -> Draining -> Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No session has started
    Idle,
    /// The guard is held and the start URL is being enqueued
    Seeding,
    /// Entries are being fetched and expanded
    Running,
    /// The frontier is empty and nothing is in flight
    Draining,
    /// The summary is available and the guard has been released
    Completed,
}

impl SessionPhase {
    /// Returns the only phase this one may advance to
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Seeding),
            Self::Seeding => Some(Self::Running),
            Self::Running => Some(Self::Draining),
            Self::Draining => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Seeding | Self::Running | Self::Draining)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain() {
        let mut phase = SessionPhase::Idle;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(phase.can_transition_to(next));
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                SessionPhase::Idle,
                SessionPhase::Seeding,
                SessionPhase::Running,
                SessionPhase::Draining,
                SessionPhase::Completed,
            ]
        );
    }

    #[test]
    fn test_skips_and_reversals_rejected() {
        assert!(!SessionPhase::Idle.can_transition_to(SessionPhase::Running));
        assert!(!SessionPhase::Running.can_transition_to(SessionPhase::Seeding));
        assert!(!SessionPhase::Completed.can_transition_to(SessionPhase::Idle));
    }

    #[test]
    fn test_active_phases() {
        assert!(!SessionPhase::Idle.is_active());
        assert!(SessionPhase::Running.is_active());
        assert!(!SessionPhase::Completed.is_active());
    }
}
