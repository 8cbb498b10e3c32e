use crate::dispatcher::VerificationDispatcher;
use crate::rate_limit::AttemptTracker;

// app's shared state
pub struct AppState {
    pub tracker: AttemptTracker,
    pub dispatcher: VerificationDispatcher,
}
