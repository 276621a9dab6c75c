/// What the settings form shows next to the save indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

/// Result of the last remote write attempt of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteOutcome {
    #[default]
    None,
    Saved,
    Failed,
}

/// Inputs the indicator is derived from.
#[derive(Debug, Clone, Copy)]
pub struct SaveStateInputs {
    pub hydrated: bool,
    pub in_flight: bool,
    /// Current serialization differs from the last acknowledged one.
    pub dirty: bool,
    pub outcome: WriteOutcome,
}

#[must_use]
pub fn derive_save_state(inputs: SaveStateInputs) -> SaveState {
    if !inputs.hydrated {
        return SaveState::Idle;
    }
    if inputs.in_flight {
        return SaveState::Saving;
    }
    match (inputs.dirty, inputs.outcome) {
        (true, WriteOutcome::Failed) => SaveState::Error,
        (true, _) => SaveState::Saving,
        (false, WriteOutcome::Saved) => SaveState::Saved,
        (false, _) => SaveState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(dirty: bool, in_flight: bool, outcome: WriteOutcome) -> SaveStateInputs {
        SaveStateInputs {
            hydrated: true,
            in_flight,
            dirty,
            outcome,
        }
    }

    #[test]
    fn test_not_hydrated_is_idle() {
        let state = derive_save_state(SaveStateInputs {
            hydrated: false,
            in_flight: true,
            dirty: true,
            outcome: WriteOutcome::Failed,
        });
        assert_eq!(state, SaveState::Idle);
    }

    #[test]
    fn test_in_flight_is_saving() {
        assert_eq!(
            derive_save_state(inputs(false, true, WriteOutcome::Saved)),
            SaveState::Saving
        );
    }

    #[test]
    fn test_dirty_after_failure_is_error() {
        assert_eq!(
            derive_save_state(inputs(true, false, WriteOutcome::Failed)),
            SaveState::Error
        );
        assert_eq!(
            derive_save_state(inputs(true, false, WriteOutcome::Saved)),
            SaveState::Saving
        );
    }

    #[test]
    fn test_clean_reflects_last_outcome() {
        assert_eq!(
            derive_save_state(inputs(false, false, WriteOutcome::Saved)),
            SaveState::Saved
        );
        assert_eq!(
            derive_save_state(inputs(false, false, WriteOutcome::None)),
            SaveState::Idle
        );
        assert_eq!(
            derive_save_state(inputs(false, false, WriteOutcome::Failed)),
            SaveState::Idle
        );
    }
}
