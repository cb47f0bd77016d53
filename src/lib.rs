pub mod api;
pub mod app;
pub mod model;

#[cfg(feature = "ssr")]
use std::sync::{Arc, RwLock};

#[cfg(feature = "ssr")]
use axum::extract::{Path, Query, State};
#[cfg(feature = "ssr")]
use axum::http::StatusCode;
#[cfg(feature = "ssr")]
use axum::routing::{get, post};
#[cfg(feature = "ssr")]
use axum::{Json, Router};
#[cfg(feature = "ssr")]
use indexmap::IndexMap;

#[cfg(feature = "ssr")]
use crate::api::{ErrorDetail, SignupReceipt};
#[cfg(feature = "ssr")]
use crate::model::{Activity, Catalog};

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}

/// Shared in-memory activity roster. Signups live for the lifetime of the
/// process; a restart starts over from the seed data.
#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct ActivityStore {
    inner: Arc<RwLock<IndexMap<String, Activity>>>,
}

/// Why the store refused a signup. The display text is what goes out on the
/// wire as `detail`.
#[cfg(feature = "ssr")]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignupRefusal {
    #[error("Activity not found")]
    UnknownActivity,
    #[error("Student is already signed up")]
    AlreadySignedUp,
    #[error("Activity is full")]
    Full,
}

#[cfg(feature = "ssr")]
impl SignupRefusal {
    pub fn status(&self) -> StatusCode {
        match self {
            SignupRefusal::UnknownActivity => StatusCode::NOT_FOUND,
            SignupRefusal::AlreadySignedUp | SignupRefusal::Full => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(feature = "ssr")]
impl ActivityStore {
    /// Creates a store over the given roster.
    pub fn new(activities: IndexMap<String, Activity>) -> Self {
        ActivityStore {
            inner: Arc::new(RwLock::new(activities)),
        }
    }

    /// Creates a store preloaded with the school's activity roster.
    pub fn seeded() -> Self {
        let activities = IndexMap::from([
            (
                "Chess Club".to_string(),
                Activity {
                    description: "Learn strategies and compete in chess tournaments".to_string(),
                    schedule: "Fridays, 3:30 PM - 5:00 PM".to_string(),
                    max_participants: 12,
                    participants: vec![
                        "michael@mergington.edu".to_string(),
                        "daniel@mergington.edu".to_string(),
                    ],
                },
            ),
            (
                "Programming Class".to_string(),
                Activity {
                    description: "Learn programming fundamentals and build software projects"
                        .to_string(),
                    schedule: "Tuesdays and Thursdays, 3:30 PM - 4:30 PM".to_string(),
                    max_participants: 20,
                    participants: vec![
                        "emma@mergington.edu".to_string(),
                        "sophia@mergington.edu".to_string(),
                    ],
                },
            ),
            (
                "Gym Class".to_string(),
                Activity {
                    description: "Physical education and sports activities".to_string(),
                    schedule: "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM".to_string(),
                    max_participants: 30,
                    participants: vec![
                        "john@mergington.edu".to_string(),
                        "olivia@mergington.edu".to_string(),
                    ],
                },
            ),
        ]);
        ActivityStore::new(activities)
    }

    /// Snapshot of the catalog in insertion order.
    pub fn snapshot(&self) -> Catalog {
        let activities = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Catalog::from(activities.clone())
    }

    /// Registers `email` for `activity_name` and returns the confirmation
    /// message.
    ///
    /// The duplicate check here is exact string equality; catching spelling
    /// variants (case, stray whitespace) is the client's concern.
    pub fn signup(&self, activity_name: &str, email: &str) -> Result<String, SignupRefusal> {
        let mut activities = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let activity = match activities.get_mut(activity_name) {
            Some(activity) => activity,
            None => return Err(SignupRefusal::UnknownActivity),
        };
        if activity.participants.iter().any(|p| p == email) {
            return Err(SignupRefusal::AlreadySignedUp);
        }
        if activity.participants.len() >= activity.max_participants as usize {
            return Err(SignupRefusal::Full);
        }
        activity.participants.push(email.to_string());
        Ok(format!("Signed up {} for {}", email, activity_name))
    }
}

/// Routes of the activities service, ready to merge into the site router.
#[cfg(feature = "ssr")]
pub fn api_router<S>(store: ActivityStore) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/activities", get(list_activities))
        .route("/activities/{activity_name}/signup", post(handle_signup))
        .with_state(store)
}

#[cfg(feature = "ssr")]
async fn list_activities(State(store): State<ActivityStore>) -> Json<Catalog> {
    Json(store.snapshot())
}

#[cfg(feature = "ssr")]
#[derive(serde::Deserialize)]
struct SignupParams {
    email: String,
}

#[cfg(feature = "ssr")]
async fn handle_signup(
    State(store): State<ActivityStore>,
    Path(activity_name): Path<String>,
    Query(params): Query<SignupParams>,
) -> Result<Json<SignupReceipt>, (StatusCode, Json<ErrorDetail>)> {
    match store.signup(&activity_name, &params.email) {
        Ok(message) => Ok(Json(SignupReceipt { message })),
        Err(refusal) => Err((
            refusal.status(),
            Json(ErrorDetail {
                detail: refusal.to_string(),
            }),
        )),
    }
}

#[cfg(all(test, feature = "ssr"))]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog() {
        let store = ActivityStore::seeded();
        let catalog = store.snapshot();
        let names: Vec<String> = catalog.iter().map(|(name, _)| name.clone()).collect();
        assert_eq!(names, vec!["Chess Club", "Programming Class", "Gym Class"]);

        let chess = catalog.get("Chess Club").expect("Chess Club missing");
        assert_eq!(chess.max_participants, 12);
        assert_eq!(chess.participants.len(), 2);
        assert_eq!(chess.spots_left(), 10);
    }

    #[test]
    fn test_signup_appends_participant() {
        let store = ActivityStore::seeded();
        let message = store
            .signup("Chess Club", "newcomer@mergington.edu")
            .expect("Signup should succeed");
        assert_eq!(message, "Signed up newcomer@mergington.edu for Chess Club");

        let catalog = store.snapshot();
        let chess = catalog.get("Chess Club").expect("Chess Club missing");
        assert_eq!(
            chess.participants.last().map(String::as_str),
            Some("newcomer@mergington.edu")
        );
        assert_eq!(chess.spots_left(), 9);
    }

    #[test]
    fn test_signup_unknown_activity() {
        let store = ActivityStore::seeded();
        let err = store
            .signup("Drama Club", "someone@mergington.edu")
            .expect_err("Unknown activity should be refused");
        assert_eq!(err, SignupRefusal::UnknownActivity);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_signup_duplicate_is_exact_match() {
        let store = ActivityStore::seeded();
        let err = store
            .signup("Chess Club", "michael@mergington.edu")
            .expect_err("Exact duplicate should be refused");
        assert_eq!(err, SignupRefusal::AlreadySignedUp);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // The store itself only refuses exact matches; spelling variants are
        // caught client-side before a request is ever made.
        store
            .signup("Chess Club", "MICHAEL@mergington.edu")
            .expect("Different spelling should pass the store's check");
    }

    #[test]
    fn test_signup_full_activity() {
        let store = ActivityStore::seeded();
        // Chess Club seeds 2 of 12; fill the remaining seats.
        for i in 0..10 {
            store
                .signup("Chess Club", &format!("student{}@mergington.edu", i))
                .expect("Seat should be available");
        }
        let err = store
            .signup("Chess Club", "late@mergington.edu")
            .expect_err("Full activity should be refused");
        assert_eq!(err, SignupRefusal::Full);
        assert_eq!(err.to_string(), "Activity is full");
    }
}
