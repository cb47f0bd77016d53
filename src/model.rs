use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long a status message stays visible before it is dismissed.
pub const MESSAGE_TIMEOUT_MS: u32 = 5_000;

/// A single extracurricular activity as served by the activities endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>,
}

impl Activity {
    /// Capacity minus current participant count. Recomputed on every render,
    /// never stored. Negative if the server overbooked.
    pub fn spots_left(&self) -> i64 {
        self.max_participants as i64 - self.participants.len() as i64
    }
}

/// The full set of activities known at a point in time, keyed by activity
/// name in the order the server sent them.
///
/// The catalog is replaced wholesale per successful fetch and read-only
/// everywhere else; there is deliberately no way to change a single entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(IndexMap<String, Activity>);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Activity)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, Activity>> for Catalog {
    fn from(activities: IndexMap<String, Activity>) -> Self {
        Catalog(activities)
    }
}

impl FromIterator<(String, Activity)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Activity)>>(iter: I) -> Self {
        Catalog(iter.into_iter().collect())
    }
}

/// Normalizes an email for duplicate comparison: surrounding whitespace is
/// ignored and case is folded.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns true if `email` is already registered for `activity_name`.
/// An empty or unknown activity name is never a duplicate.
pub fn is_already_signed_up(catalog: &Catalog, activity_name: &str, email: &str) -> bool {
    let activity = match catalog.get(activity_name) {
        Some(activity) => activity,
        None => return false,
    };
    let candidate = normalize_email(email);
    activity
        .participants
        .iter()
        .any(|participant| normalize_email(participant) == candidate)
}

/// A signup attempt rejected before any request is made. The display text is
/// shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Select an activity.")]
    NoActivity,
    #[error("Enter a valid email address.")]
    NoEmail,
    #[error("This participant is already registered for the activity.")]
    AlreadySignedUp,
}

/// A validated signup, ready for transmission. The email has been trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct SignupRequest {
    pub activity: String,
    pub email: String,
}

/// Validates a signup attempt against the current catalog. Checks run in
/// order and stop at the first failure: an activity must be selected, the
/// trimmed email must be non-empty, and the email must not already be
/// registered for that activity.
pub fn validate_signup(
    catalog: &Catalog,
    activity: &str,
    email: &str,
) -> Result<SignupRequest, ValidationError> {
    let email = email.trim();
    if activity.is_empty() {
        return Err(ValidationError::NoActivity);
    }
    if email.is_empty() {
        return Err(ValidationError::NoEmail);
    }
    if is_already_signed_up(catalog, activity, email) {
        return Err(ValidationError::AlreadySignedUp);
    }
    Ok(SignupRequest {
        activity: activity.to_string(),
        email: email.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// The single transient status banner. At most one message is visible at a
/// time; showing a new one replaces the old and invalidates its pending
/// dismissal through the generation counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusBanner {
    current: Option<(StatusKind, String)>,
    generation: u64,
}

impl StatusBanner {
    /// Shows a message, replacing any visible one. Returns the generation
    /// token to pass back to `dismiss` once the display window elapses.
    pub fn show(&mut self, kind: StatusKind, text: impl Into<String>) -> u64 {
        self.generation += 1;
        self.current = Some((kind, text.into()));
        self.generation
    }

    /// Clears the banner if `generation` still identifies the visible
    /// message. A dismissal outlived by a newer message is a no-op.
    pub fn dismiss(&mut self, generation: u64) {
        if self.generation == generation {
            self.current = None;
        }
    }

    pub fn visible(&self) -> Option<(StatusKind, &str)> {
        self.current.as_ref().map(|(kind, text)| (*kind, text.as_str()))
    }
}
