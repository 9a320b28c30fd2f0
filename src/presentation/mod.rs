//! Per-invocation presentation state.
//!
//! Each user action owns one [`Presentation`] handle and drives it
//! idle → loading → success | error. Nothing is shared between
//! invocations and nothing is looked up by a well-known identifier;
//! the handle lives exactly as long as the view it describes.

use std::time::Duration;

/// How long a success view stays up without interaction.
pub const SUCCESS_DISMISS: Duration = Duration::from_secs(30);

/// How long an error notice stays up.
pub const ERROR_DISMISS: Duration = Duration::from_secs(5);

/// Whether the in-place substitution is currently in effect. Only the
/// surface that rewrites text in place moves this off `NotApplied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    NotApplied,
    Applied,
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    Loading,
    Success {
        original: String,
        enhanced: String,
        replacement: Replacement,
    },
    Error {
        message: String,
    },
}

/// Why a transition was refused.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// An enhancement is already in flight. Surfaces keep the trigger
    /// disabled instead of queueing a second request.
    #[error("an enhancement is already in flight")]
    Busy,
    #[error("the current view does not allow this action")]
    WrongState,
}

/// One invocation's view state.
#[derive(Debug)]
pub struct Presentation {
    state: State,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == State::Loading
    }

    /// Start a request: anything but Loading → Loading.
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        if self.is_loading() {
            return Err(TransitionError::Busy);
        }
        self.state = State::Loading;
        Ok(())
    }

    /// Loading → Success. The result view keeps both texts so the surface
    /// can show them side by side and support replace/revert.
    pub fn succeed(
        &mut self,
        original: impl Into<String>,
        enhanced: impl Into<String>,
    ) -> Result<(), TransitionError> {
        if !self.is_loading() {
            return Err(TransitionError::WrongState);
        }
        self.state = State::Success {
            original: original.into(),
            enhanced: enhanced.into(),
            replacement: Replacement::NotApplied,
        };
        Ok(())
    }

    /// Loading → Error.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        if !self.is_loading() {
            return Err(TransitionError::WrongState);
        }
        self.state = State::Error {
            message: message.into(),
        };
        Ok(())
    }

    /// Mark the in-place substitution applied.
    pub fn apply(&mut self) -> Result<(), TransitionError> {
        match &mut self.state {
            State::Success { replacement, .. } if *replacement == Replacement::NotApplied => {
                *replacement = Replacement::Applied;
                Ok(())
            }
            _ => Err(TransitionError::WrongState),
        }
    }

    /// Undo the substitution: Applied → Reverted.
    pub fn revert(&mut self) -> Result<(), TransitionError> {
        match &mut self.state {
            State::Success { replacement, .. } if *replacement == Replacement::Applied => {
                *replacement = Replacement::Reverted;
                Ok(())
            }
            _ => Err(TransitionError::WrongState),
        }
    }

    /// Tear the view down, explicitly or when its deadline fires. Not
    /// possible mid-flight.
    pub fn dismiss(&mut self) -> Result<(), TransitionError> {
        if self.is_loading() {
            return Err(TransitionError::WrongState);
        }
        self.state = State::Idle;
        Ok(())
    }

    /// The view's self-dismiss deadline, if it has one. Surfaces race this
    /// against user input; explicit dismissal cancels the timer.
    pub fn auto_dismiss(&self) -> Option<Duration> {
        match &self.state {
            State::Success { .. } => Some(SUCCESS_DISMISS),
            State::Error { .. } => Some(ERROR_DISMISS),
            State::Idle | State::Loading => None,
        }
    }
}
