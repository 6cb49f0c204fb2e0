use crate::error::TrackerError;
use crate::types::{Profile, Repository};

/// Which text field receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Username,
    Filter,
    Browse,
}

#[derive(Debug)]
pub enum Action {
    Quit,
    ScrollUp,
    ScrollDown,
    GoToTop,
    GoToBottom,

    // Username field
    FocusUsername,
    UsernameInput(char),
    UsernameBackspace,
    ClearUsername,
    Submit,

    // Filter field
    FocusFilter,
    FilterInput(char),
    FilterBackspace,
    ClearFilter,

    ExitInput,
    Paste(String),

    // Pagination
    NextPage,
    PrevPage,
    Refresh,

    // Fetch outcomes, tagged with the token of the request that produced them
    ProfileFetched {
        token: u64,
        result: Result<Profile, TrackerError>,
    },
    ReposFetched {
        token: u64,
        result: Result<Vec<Repository>, TrackerError>,
    },

    // Links
    OpenRepo,
    OpenProfile,
    YankUrl,

    Error(String),
    None,
}

impl Action {
    /// False for fetch outcomes that arrive on their own
    pub fn is_user_driven(&self) -> bool {
        !matches!(
            self,
            Action::ProfileFetched { .. } | Action::ReposFetched { .. } | Action::None
        )
    }
}

impl From<TrackerError> for Action {
    fn from(err: TrackerError) -> Self {
        Action::Error(err.to_string())
    }
}
