//! Ownership checks for mutating and scoped routes
//!
//! A resource with no owner recorded (rows created before ownership
//! existed) is readable and writable by any authenticated user.

use crate::domain::{Action, Project, ReportView, Task, User};
use crate::error::{ApiError, ApiResult};
use crate::store::Store;

/// A record that may carry an owning user
pub trait Owned: Sized {
    /// Singular noun used in error messages
    const KIND: &'static str;

    fn owner_id(&self) -> Option<&str>;

    fn load(store: &Store, id: &str) -> anyhow::Result<Option<Self>>;
}

impl Owned for Project {
    const KIND: &'static str = "project";

    fn owner_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn load(store: &Store, id: &str) -> anyhow::Result<Option<Self>> {
        store.get_project(id)
    }
}

impl Owned for Task {
    const KIND: &'static str = "task";

    fn owner_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn load(store: &Store, id: &str) -> anyhow::Result<Option<Self>> {
        store.get_task(id)
    }
}

impl Owned for Action {
    const KIND: &'static str = "action";

    fn owner_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn load(store: &Store, id: &str) -> anyhow::Result<Option<Self>> {
        store.get_action(id)
    }
}

impl Owned for ReportView {
    const KIND: &'static str = "report view";

    fn owner_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn load(store: &Store, id: &str) -> anyhow::Result<Option<Self>> {
        store.get_view(id)
    }
}

/// Decide access to an already-fetched resource
pub fn check_ownership<T: Owned>(resource: Option<T>, user: &User) -> ApiResult<T> {
    let resource = resource
        .ok_or_else(|| ApiError::not_found(format!("{} not found", capitalize(T::KIND))))?;
    match resource.owner_id() {
        Some(owner) if owner != user.id => Err(ApiError::forbidden(format!(
            "You do not have permission to access this {}",
            T::KIND
        ))),
        _ => Ok(resource),
    }
}

/// Fetch a resource by path id and check the requester may touch it
pub fn load_owned<T: Owned>(store: &Store, id: &str, user: &User) -> ApiResult<T> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::validation(format!(
            "{} id is required",
            capitalize(T::KIND)
        )));
    }
    check_ownership(T::load(store, id)?, user)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectInput;
    use chrono::Utc;

    fn user(email: &str) -> User {
        User::new(email, None, Utc::now())
    }

    fn project_for(owner: &User) -> Project {
        ProjectInput {
            name: Some("Client".into()),
            ..Default::default()
        }
        .into_project(&owner.id, Utc::now())
        .unwrap()
    }

    #[test]
    fn test_owner_passes_other_user_forbidden() {
        let alice = user("alice@example.com");
        let bob = user("bob@example.com");
        let project = project_for(&alice);

        assert!(check_ownership(Some(project.clone()), &alice).is_ok());
        let err = check_ownership(Some(project), &bob).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        let err = check_ownership::<Project>(None, &user("a@example.com")).unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Project not found");
    }

    #[test]
    fn test_legacy_rows_without_owner_are_open() {
        let mut project = project_for(&user("alice@example.com"));
        project.user_id = None;
        assert!(check_ownership(Some(project), &user("bob@example.com")).is_ok());
    }

    #[test]
    fn test_load_owned_requires_id() {
        let store = Store::open_in_memory().unwrap();
        let err = load_owned::<Task>(&store, " ", &user("a@example.com")).unwrap_err();
        assert_eq!(err.status_code(), 400);
        let err = load_owned::<Task>(&store, "nope", &user("a@example.com")).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
