//! Platform identity lookups and URL construction
//!
//! Transformers never touch the platform's user store directly; the lookups
//! they need sit behind `IdentityResolver` so the pipeline stays testable and
//! host-agnostic. `TransformContext` combines a resolver with the configured
//! LMS root URL and derives every profile/team/certificate link from it.

use std::sync::Arc;

use crate::error::{CaliperError, CaliperResult};

/// Lookups only the hosting platform can answer
pub trait IdentityResolver: Send + Sync {
    /// Username for a numeric platform user id
    fn username_from_user_id(&self, user_id: i64) -> Option<String>;

    /// Discussion topic id a team belongs to
    fn topic_id_from_team_id(&self, team_id: &str) -> Option<String>;
}

/// Resolver that answers nothing; lookup-dependent transformers degrade to
/// an `IdentityLookup` error
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl IdentityResolver for NullResolver {
    fn username_from_user_id(&self, _user_id: i64) -> Option<String> {
        None
    }

    fn topic_id_from_team_id(&self, _team_id: &str) -> Option<String> {
        None
    }
}

/// Everything a transformer needs besides the raw event itself
#[derive(Clone)]
pub struct TransformContext {
    lms_root_url: String,
    resolver: Arc<dyn IdentityResolver>,
}

impl TransformContext {
    pub fn new(lms_root_url: impl Into<String>, resolver: Arc<dyn IdentityResolver>) -> Self {
        let mut lms_root_url = lms_root_url.into();
        while lms_root_url.ends_with('/') {
            lms_root_url.pop();
        }
        TransformContext {
            lms_root_url,
            resolver,
        }
    }

    pub fn lms_root_url(&self) -> &str {
        &self.lms_root_url
    }

    /// Public profile URL for a username
    pub fn user_link(&self, username: &str) -> String {
        format!("{}/u/{}", self.lms_root_url, username)
    }

    /// Profile URL for a numeric user id, via the resolver
    pub fn user_link_from_id(&self, user_id: i64) -> CaliperResult<String> {
        let username = self.resolver.username_from_user_id(user_id).ok_or_else(|| {
            CaliperError::IdentityLookup(format!("no username for user id {user_id}"))
        })?;
        Ok(self.user_link(&username))
    }

    /// Username for a numeric user id, via the resolver
    pub fn username_from_id(&self, user_id: i64) -> CaliperResult<String> {
        self.resolver.username_from_user_id(user_id).ok_or_else(|| {
            CaliperError::IdentityLookup(format!("no username for user id {user_id}"))
        })
    }

    /// Team page URL, anchored off the teams tab the event came from
    pub fn team_url(&self, referer: &str, team_id: &str) -> CaliperResult<String> {
        let topic_id = self.resolver.topic_id_from_team_id(team_id).ok_or_else(|| {
            CaliperError::IdentityLookup(format!("no topic for team '{team_id}'"))
        })?;
        Ok(format!("{referer}#teams/{topic_id}/{team_id}"))
    }

    /// Web certificate URL for a user/course pair
    pub fn certificate_url(&self, user_id: &str, course_id: &str) -> String {
        format!(
            "{}/certificates/user/{}/course/{}",
            self.lms_root_url, user_id, course_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FixedResolver;

    impl IdentityResolver for FixedResolver {
        fn username_from_user_id(&self, user_id: i64) -> Option<String> {
            (user_id == 7).then(|| "honor".to_string())
        }

        fn topic_id_from_team_id(&self, team_id: &str) -> Option<String> {
            (team_id == "1").then(|| "1".to_string())
        }
    }

    fn context() -> TransformContext {
        TransformContext::new("http://localhost:18000", Arc::new(FixedResolver))
    }

    #[test]
    fn test_user_link_shape() {
        assert_eq!(context().user_link("honor"), "http://localhost:18000/u/honor");
    }

    #[test]
    fn test_root_url_trailing_slash_is_trimmed() {
        let ctx = TransformContext::new("http://localhost:18000/", Arc::new(NullResolver));
        assert_eq!(ctx.user_link("honor"), "http://localhost:18000/u/honor");
    }

    #[test]
    fn test_user_link_from_id_resolves() {
        assert_eq!(
            context().user_link_from_id(7).unwrap(),
            "http://localhost:18000/u/honor"
        );
    }

    #[test]
    fn test_unresolvable_user_id_is_a_lookup_error() {
        assert!(matches!(
            context().user_link_from_id(99),
            Err(CaliperError::IdentityLookup(_))
        ));
    }

    #[test]
    fn test_team_url_shape() {
        let url = context()
            .team_url("http://localhost:18000/courses/dummy-course-id/teams/", "1")
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:18000/courses/dummy-course-id/teams/#teams/1/1"
        );
    }

    #[test]
    fn test_certificate_url_shape() {
        assert_eq!(
            context().certificate_url("5", "course-v1:edX+DemoX+Demo_Course"),
            "http://localhost:18000/certificates/user/5/course/course-v1:edX+DemoX+Demo_Course"
        );
    }
}
