//! Fetch, pagination and filter state for one looked-up user.
//!
//! `Session` never performs I/O. Operations that need the network return a
//! [`Request`]; the caller runs it and feeds the outcome back through
//! [`Session::profile_loaded`] or [`Session::repos_loaded`] together with the
//! request's token. Outcomes carrying a token that is no longer current are
//! dropped, so a slow response can never overwrite newer state.

use crate::error::Result;
use crate::types::{Profile, Repository};

pub const USERNAME_REQUIRED: &str = "Please enter a GitHub username.";
pub const PROFILE_FAILED: &str = "Failed to fetch profile data. Please try again later.";
pub const REPOS_FAILED: &str = "Failed to fetch repositories. Please try again later.";

/// Progress of one kind of fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl Status {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Status::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Page position. `has_more` is a guess: a full last page looks the same as
/// a page with more behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
}

impl Cursor {
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            has_more: false,
        }
    }

    fn reset(&mut self) {
        self.page = 1;
        self.has_more = false;
    }

    fn observe(&mut self, count: usize) {
        self.has_more = count == self.per_page as usize;
    }
}

/// A fetch the caller must perform on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Profile {
        token: u64,
        username: String,
    },
    Repos {
        token: u64,
        username: String,
        page: u32,
        per_page: u32,
    },
}

impl Request {
    pub fn token(&self) -> u64 {
        match self {
            Request::Profile { token, .. } | Request::Repos { token, .. } => *token,
        }
    }
}

/// What the repository panel should show.
#[derive(Debug, PartialEq, Eq)]
pub enum RepoView<'a> {
    Repos(Vec<&'a Repository>),
    /// The page has repositories but none match the filter term.
    NoMatches(&'a str),
    NoRepositories,
}

#[derive(Debug)]
pub struct Session {
    input: String,
    username: Option<String>,
    profile: Option<Profile>,
    repos: Vec<Repository>,
    cursor: Cursor,
    filter: String,
    profile_status: Status,
    repos_status: Status,
    next_token: u64,
    profile_token: Option<u64>,
    repos_token: Option<u64>,
    // (username, page) of the last repository request
    requested: Option<(String, u32)>,
}

impl Session {
    pub fn new(per_page: u32) -> Self {
        Self {
            input: String::new(),
            username: None,
            profile: None,
            repos: Vec::new(),
            cursor: Cursor::new(per_page),
            filter: String::new(),
            profile_status: Status::Idle,
            repos_status: Status::Idle,
            next_token: 0,
            profile_token: None,
            repos_token: None,
            requested: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The username the current profile and repositories belong to.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn repos(&self) -> &[Repository] {
        &self.repos
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn profile_status(&self) -> &Status {
        &self.profile_status
    }

    pub fn repos_status(&self) -> &Status {
        &self.repos_status
    }

    pub fn is_loading(&self) -> bool {
        self.profile_status.is_loading() || self.repos_status.is_loading()
    }

    /// Profile errors take precedence; they explain why no repositories exist.
    pub fn error(&self) -> Option<&str> {
        self.profile_status
            .error()
            .or_else(|| self.repos_status.error())
    }

    pub fn can_next(&self) -> bool {
        self.cursor.has_more && !self.is_loading()
    }

    pub fn can_prev(&self) -> bool {
        self.cursor.page > 1 && !self.is_loading()
    }

    /// Replace the raw username text. Any edit that changes the trimmed value
    /// drops everything fetched for the previous username.
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
        if self.username.as_deref() != Some(self.input.trim()) {
            self.reset();
        }
    }

    pub fn push_input(&mut self, c: char) {
        let mut value = std::mem::take(&mut self.input);
        value.push(c);
        self.set_input(value);
    }

    pub fn pop_input(&mut self) {
        let mut value = std::mem::take(&mut self.input);
        value.pop();
        self.set_input(value);
    }

    /// Look up the typed username. Clears whatever is shown right away.
    pub fn submit(&mut self) -> Option<Request> {
        let username = self.input.trim().to_string();
        self.reset();

        if username.is_empty() {
            self.profile_status = Status::Error(USERNAME_REQUIRED.to_string());
            return None;
        }

        let token = self.issue_token();
        self.username = Some(username.clone());
        self.profile_token = Some(token);
        self.profile_status = Status::Loading;
        tracing::debug!(token, %username, "profile requested");
        Some(Request::Profile { token, username })
    }

    /// Apply a profile outcome. On success this yields the page-1 repository
    /// request.
    pub fn profile_loaded(&mut self, token: u64, result: Result<Profile>) -> Option<Request> {
        if self.profile_token != Some(token) {
            tracing::debug!(token, "dropping stale profile response");
            return None;
        }
        self.profile_token = None;

        match result {
            Ok(profile) => {
                self.profile = Some(profile);
                self.profile_status = Status::Success;
                self.cursor.reset();
                self.sync_repos(false)
            }
            Err(err) => {
                let message = if err.is_not_found() {
                    format!(
                        "GitHub user \"{}\" not found.",
                        self.username.as_deref().unwrap_or_default()
                    )
                } else {
                    PROFILE_FAILED.to_string()
                };
                tracing::warn!("profile fetch failed: {}", err);
                self.profile = None;
                self.repos.clear();
                self.cursor.has_more = false;
                self.profile_status = Status::Error(message);
                None
            }
        }
    }

    /// Apply a repository outcome. Returns `false` when it was stale and
    /// dropped.
    pub fn repos_loaded(&mut self, token: u64, result: Result<Vec<Repository>>) -> bool {
        if self.repos_token != Some(token) {
            tracing::debug!(token, "dropping stale repositories response");
            return false;
        }
        self.repos_token = None;

        match result {
            Ok(repos) => {
                self.cursor.observe(repos.len());
                self.repos = repos;
                self.repos_status = Status::Success;
            }
            Err(err) => {
                let message = if err.is_not_found() {
                    format!(
                        "Could not retrieve public repositories for \"{}\".",
                        self.username.as_deref().unwrap_or_default()
                    )
                } else {
                    REPOS_FAILED.to_string()
                };
                tracing::warn!("repositories fetch failed: {}", err);
                self.repos.clear();
                self.cursor.has_more = false;
                self.repos_status = Status::Error(message);
            }
        }
        true
    }

    pub fn next_page(&mut self) -> Option<Request> {
        if !self.can_next() {
            return None;
        }
        self.cursor.page += 1;
        self.sync_repos(false)
    }

    pub fn prev_page(&mut self) -> Option<Request> {
        if !self.can_prev() {
            return None;
        }
        self.cursor.page = self.cursor.page.saturating_sub(1).max(1);
        self.sync_repos(false)
    }

    /// Fetch the current page again. Without a loaded profile this retries
    /// the whole lookup; with no username typed it does nothing.
    pub fn refresh(&mut self) -> Option<Request> {
        if self.is_loading() || self.input.trim().is_empty() {
            return None;
        }
        if self.profile.is_none() {
            return self.submit();
        }
        self.sync_repos(true)
    }

    pub fn set_filter(&mut self, term: impl Into<String>) {
        self.filter = term.into();
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
    }

    /// Loaded repositories whose name contains the filter term, ignoring case.
    pub fn visible(&self) -> Vec<&Repository> {
        filter_repos(&self.repos, &self.filter)
    }

    pub fn view(&self) -> RepoView<'_> {
        let visible = self.visible();
        if !visible.is_empty() {
            RepoView::Repos(visible)
        } else if !self.filter.is_empty() {
            RepoView::NoMatches(&self.filter)
        } else {
            RepoView::NoRepositories
        }
    }

    /// Issue a repository request whenever (username, page) differs from the
    /// last one requested, or unconditionally when `force` is set.
    fn sync_repos(&mut self, force: bool) -> Option<Request> {
        self.profile.as_ref()?;
        let username = self.username.clone()?;
        let key = (username.clone(), self.cursor.page);
        if !force && self.requested.as_ref() == Some(&key) {
            return None;
        }

        let token = self.issue_token();
        self.requested = Some(key);
        self.repos_token = Some(token);
        self.repos_status = Status::Loading;
        tracing::debug!(token, %username, page = self.cursor.page, "repositories requested");
        Some(Request::Repos {
            token,
            username,
            page: self.cursor.page,
            per_page: self.cursor.per_page,
        })
    }

    fn reset(&mut self) {
        self.username = None;
        self.profile = None;
        self.repos.clear();
        self.cursor.reset();
        self.profile_status = Status::Idle;
        self.repos_status = Status::Idle;
        self.profile_token = None;
        self.repos_token = None;
        self.requested = None;
    }

    fn issue_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }
}

pub fn filter_repos<'a>(repos: &'a [Repository], term: &str) -> Vec<&'a Repository> {
    let needle = term.to_lowercase();
    repos.iter().filter(|r| r.name_matches(&needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::source::mock::{profile, repo};

    fn repos(n: usize) -> Vec<Repository> {
        (0..n).map(|i| repo(i as u64, &format!("repo-{}", i))).collect()
    }

    fn submitted(username: &str) -> (Session, u64) {
        let mut session = Session::new(30);
        session.set_input(username);
        let token = session.submit().unwrap().token();
        (session, token)
    }

    /// Submit, load the profile and the first page of `count` repositories.
    fn loaded(username: &str, count: usize) -> Session {
        let (mut session, token) = submitted(username);
        let request = session.profile_loaded(token, Ok(profile(username, count)));
        session.repos_loaded(request.unwrap().token(), Ok(repos(count)));
        session
    }

    #[test]
    fn profile_success_requests_page_one_once() {
        let (mut session, token) = submitted("octocat");
        assert!(session.profile_status().is_loading());

        let request = session.profile_loaded(token, Ok(profile("octocat", 8)));
        match request {
            Some(Request::Repos {
                username,
                page,
                per_page,
                ..
            }) => {
                assert_eq!(username, "octocat");
                assert_eq!(page, 1);
                assert_eq!(per_page, 30);
            }
            other => panic!("expected repos request, got {:?}", other),
        }
        assert_eq!(session.profile_status(), &Status::Success);
        assert!(session.repos_status().is_loading());

        // A duplicate delivery must not trigger another fetch
        assert!(session.profile_loaded(token, Ok(profile("octocat", 8))).is_none());
    }

    #[test]
    fn octocat_scenario_has_no_next_page() {
        let session = loaded("octocat", 8);
        assert_eq!(session.profile().unwrap().public_repos, 8);
        assert_eq!(session.repos().len(), 8);
        assert!(!session.cursor().has_more);
        assert!(!session.can_next());
        assert!(!session.is_loading());
    }

    #[test]
    fn torvalds_scenario_next_fetches_page_two() {
        let mut session = loaded("torvalds", 30);
        assert!(session.cursor().has_more);
        assert!(session.can_next());

        let request = session.next_page().unwrap();
        assert!(matches!(request, Request::Repos { page: 2, .. }));
        assert_eq!(session.cursor().page, 2);
    }

    #[test]
    fn has_more_boundary() {
        assert!(loaded("a", 30).cursor().has_more);
        assert!(!loaded("b", 29).cursor().has_more);
        assert!(!loaded("c", 0).cursor().has_more);
    }

    #[test]
    fn not_found_names_user_and_skips_repos() {
        let (mut session, token) = submitted("doesnotexist12345");
        let request = session.profile_loaded(
            token,
            Err(TrackerError::NotFound("/users/doesnotexist12345".into())),
        );
        assert!(request.is_none());
        assert!(session.profile().is_none());
        assert!(session.repos().is_empty());
        let error = session.error().unwrap();
        assert!(error.contains("doesnotexist12345"));
        assert!(error.contains("not found"));
        assert!(!session.is_loading());
    }

    #[test]
    fn other_profile_failures_are_generic() {
        let (mut session, token) = submitted("octocat");
        session.profile_loaded(token, Err(TrackerError::Api("GitHub API 403: rate limit".into())));
        assert_eq!(session.error(), Some(PROFILE_FAILED));

        let (mut session, token) = submitted("octocat");
        session.profile_loaded(token, Err(TrackerError::Decode("expected value".into())));
        assert_eq!(session.error(), Some(PROFILE_FAILED));
    }

    #[test]
    fn repos_failures_clear_page() {
        let mut session = loaded("torvalds", 30);
        let token = session.next_page().unwrap().token();
        session.repos_loaded(token, Err(TrackerError::NotFound("/users/torvalds/repos".into())));
        assert!(session.repos().is_empty());
        assert!(!session.cursor().has_more);
        assert_eq!(
            session.error(),
            Some("Could not retrieve public repositories for \"torvalds\".")
        );

        let token = session.refresh().unwrap().token();
        session.repos_loaded(token, Err(TrackerError::Api("boom".into())));
        assert_eq!(session.error(), Some(REPOS_FAILED));
    }

    #[test]
    fn empty_input_is_rejected_locally() {
        let mut session = Session::new(30);
        session.set_input("   ");
        assert!(session.submit().is_none());
        assert_eq!(session.error(), Some(USERNAME_REQUIRED));
    }

    #[test]
    fn clearing_username_resets_everything() {
        let mut session = loaded("torvalds", 30);
        let token = session.next_page().unwrap().token();
        session.repos_loaded(token, Ok(repos(30)));
        assert_eq!(session.cursor().page, 2);

        session.set_input(" ");
        assert!(session.profile().is_none());
        assert!(session.repos().is_empty());
        assert!(session.error().is_none());
        assert!(!session.cursor().has_more);
        assert_eq!(session.cursor().page, 1);
        assert!(session.username().is_none());
    }

    #[test]
    fn clearing_username_drops_profile_error() {
        let (mut session, token) = submitted("doesnotexist12345");
        session.profile_loaded(
            token,
            Err(TrackerError::NotFound("/users/doesnotexist12345".into())),
        );
        assert!(session.error().is_some());

        session.set_input("   ");
        assert!(session.error().is_none());
        assert!(session.profile().is_none());
        assert!(session.repos().is_empty());
        assert!(!session.cursor().has_more);
        assert_eq!(session.cursor().page, 1);
    }

    #[test]
    fn clearing_username_drops_repos_error() {
        let mut session = loaded("torvalds", 30);
        let token = session.next_page().unwrap().token();
        session.repos_loaded(token, Err(TrackerError::Api("boom".into())));
        assert_eq!(session.error(), Some(REPOS_FAILED));
        assert_eq!(session.cursor().page, 2);

        session.set_input("");
        assert!(session.error().is_none());
        assert!(session.profile().is_none());
        assert!(session.repos().is_empty());
        assert!(!session.cursor().has_more);
        assert_eq!(session.cursor().page, 1);
    }

    #[test]
    fn editing_username_resets_but_whitespace_does_not() {
        let mut session = loaded("octocat", 8);
        session.set_input("octocat ");
        assert!(session.profile().is_some());

        session.push_input('x');
        assert_eq!(session.input(), "octocat x");
        assert!(session.profile().is_none());
        assert_eq!(session.cursor().page, 1);
    }

    #[test]
    fn submit_trims_username() {
        let mut session = Session::new(30);
        session.set_input("  octocat\t");
        let request = session.submit().unwrap();
        assert!(matches!(request, Request::Profile { ref username, .. } if username == "octocat"));
    }

    #[test]
    fn next_is_noop_without_more() {
        let mut session = loaded("octocat", 8);
        assert!(session.next_page().is_none());
        assert_eq!(session.cursor().page, 1);
    }

    #[test]
    fn prev_is_noop_on_first_page() {
        let mut session = loaded("torvalds", 30);
        assert!(!session.can_prev());
        assert!(session.prev_page().is_none());
        assert_eq!(session.cursor().page, 1);
    }

    #[test]
    fn prev_goes_back_and_refetches() {
        let mut session = loaded("torvalds", 30);
        let token = session.next_page().unwrap().token();
        session.repos_loaded(token, Ok(repos(12)));
        assert!(!session.cursor().has_more);
        assert!(session.can_prev());

        let request = session.prev_page().unwrap();
        assert!(matches!(request, Request::Repos { page: 1, .. }));
    }

    #[test]
    fn paging_is_blocked_while_loading() {
        let mut session = loaded("torvalds", 30);
        session.next_page().unwrap();
        assert!(session.is_loading());
        assert!(!session.can_next());
        assert!(!session.can_prev());
        assert!(session.next_page().is_none());
        assert!(session.prev_page().is_none());
        assert!(session.refresh().is_none());
    }

    #[test]
    fn pages_replace_rather_than_accumulate() {
        let mut session = loaded("torvalds", 30);
        let token = session.next_page().unwrap().token();
        let page_two: Vec<Repository> = (100..105)
            .map(|i| repo(i, &format!("second-{}", i)))
            .collect();
        session.repos_loaded(token, Ok(page_two));
        assert_eq!(session.repos().len(), 5);
        assert!(session.repos().iter().all(|r| r.name.starts_with("second-")));
    }

    #[test]
    fn stale_repos_response_is_dropped_after_new_submit() {
        let mut session = loaded("torvalds", 30);
        let old = session.next_page().unwrap().token();

        session.set_input("octocat");
        let token = session.submit().unwrap().token();
        session.repos_loaded(old, Ok(repos(30)));

        assert!(session.repos().is_empty());
        assert!(session.profile_status().is_loading());
        assert!(session.is_loading());

        session.profile_loaded(token, Ok(profile("octocat", 8)));
        assert_eq!(session.profile().unwrap().login, "octocat");
    }

    #[test]
    fn stale_profile_response_is_dropped() {
        let (mut session, old) = submitted("torvalds");
        session.set_input("octocat");
        let token = session.submit().unwrap().token();

        assert!(session.profile_loaded(old, Ok(profile("torvalds", 30))).is_none());
        assert!(session.profile().is_none());
        assert!(session.profile_status().is_loading());

        assert!(session.profile_loaded(token, Ok(profile("octocat", 8))).is_some());
    }

    #[test]
    fn error_from_old_request_does_not_clobber_new_state() {
        let (mut session, old) = submitted("ghost");
        session.set_input("octocat");
        let token = session.submit().unwrap().token();
        session.profile_loaded(old, Err(TrackerError::NotFound("/users/ghost".into())));
        assert!(session.error().is_none());
        assert!(session.profile_status().is_loading());
        assert!(token > old);
    }

    #[test]
    fn refresh_refetches_same_page() {
        let mut session = loaded("octocat", 8);
        let request = session.refresh().unwrap();
        assert!(matches!(request, Request::Repos { page: 1, .. }));
    }

    #[test]
    fn refresh_without_username_is_noop() {
        let mut session = Session::new(30);
        assert!(session.refresh().is_none());
        assert!(session.error().is_none());

        session.set_input("  ");
        assert!(session.refresh().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn stale_repos_response_reports_not_applied() {
        let mut session = loaded("torvalds", 30);
        assert!(!session.repos_loaded(999, Ok(repos(3))));
        assert_eq!(session.repos().len(), 30);
    }

    #[test]
    fn refresh_without_profile_retries_lookup() {
        let (mut session, token) = submitted("octocat");
        session.profile_loaded(token, Err(TrackerError::Api("boom".into())));
        let request = session.refresh().unwrap();
        assert!(matches!(request, Request::Profile { .. }));
    }

    #[test]
    fn filter_matches_name_case_insensitively() {
        let (mut session, token) = submitted("someone");
        let request = session.profile_loaded(token, Ok(profile("someone", 2))).unwrap();
        let mut widget = repo(2, "widget");
        widget.description = Some("api client".into());
        session.repos_loaded(request.token(), Ok(vec![repo(1, "My-API-Tool"), widget]));

        session.set_filter("api");
        let names: Vec<&str> = session.visible().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["My-API-Tool"]);

        session.set_filter("");
        assert_eq!(session.visible().len(), 2);
    }

    #[test]
    fn filter_does_not_request_or_touch_cursor() {
        let mut session = loaded("torvalds", 30);
        let before = session.cursor();
        session.push_filter('x');
        session.push_filter('y');
        session.pop_filter();
        assert_eq!(session.filter(), "x");
        assert_eq!(session.cursor(), before);
        assert!(!session.is_loading());
    }

    #[test]
    fn view_distinguishes_no_matches_from_no_repos() {
        let mut session = loaded("octocat", 8);
        session.set_filter("zzz");
        assert_eq!(session.view(), RepoView::NoMatches("zzz"));

        let mut empty = loaded("nobody", 0);
        assert_eq!(empty.view(), RepoView::NoRepositories);
        empty.set_filter("zzz");
        assert_eq!(empty.view(), RepoView::NoMatches("zzz"));
    }
}
