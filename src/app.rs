use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::{Action, InputMode};
use crate::error::TrackerError;
use crate::event::Event;
use crate::session::{Request, Session};
use crate::source::UserSource;
use crate::types::Repository;

pub struct App {
    pub session: Session,
    pub mode: InputMode,
    pub repo_index: usize,
    /// One-shot message for the status bar, cleared by the next user action
    pub notice: Option<String>,
    pub should_quit: bool,
    source: Arc<dyn UserSource>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        source: Arc<dyn UserSource>,
        per_page: u32,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            session: Session::new(per_page),
            mode: InputMode::default(),
            repo_index: 0,
            notice: None,
            should_quit: false,
            source,
            action_tx,
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn selected_repo(&self) -> Option<&Repository> {
        self.session.visible().get(self.repo_index).copied()
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            // A username given on the command line is looked up right away
            Event::Init if !self.session.input().trim().is_empty() => Action::Submit,
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => Action::Paste(text),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match self.mode {
            InputMode::Username => match key.code {
                KeyCode::Enter => Action::Submit,
                KeyCode::Esc => Action::ExitInput,
                KeyCode::Tab => Action::FocusFilter,
                KeyCode::Backspace => Action::UsernameBackspace,
                KeyCode::Char('u') if ctrl => Action::ClearUsername,
                KeyCode::Char(c) if !ctrl => Action::UsernameInput(c),
                _ => Action::None,
            },
            InputMode::Filter => match key.code {
                KeyCode::Enter | KeyCode::Esc => Action::ExitInput,
                KeyCode::Tab => Action::FocusUsername,
                KeyCode::Backspace => Action::FilterBackspace,
                KeyCode::Char('u') if ctrl => Action::ClearFilter,
                KeyCode::Char(c) if !ctrl => Action::FilterInput(c),
                _ => Action::None,
            },
            InputMode::Browse => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
                KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
                KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right => Action::NextPage,
                KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left => Action::PrevPage,
                KeyCode::Char('r') => Action::Refresh,
                KeyCode::Char('/') => Action::FocusFilter,
                KeyCode::Char('u') | KeyCode::Char('i') => Action::FocusUsername,
                KeyCode::Char('c') => Action::ClearFilter,
                KeyCode::Char('o') | KeyCode::Enter => Action::OpenRepo,
                KeyCode::Char('O') => Action::OpenProfile,
                KeyCode::Char('y') => Action::YankUrl,
                _ => Action::None,
            },
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.notice.is_some() && action.is_user_driven() {
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ScrollUp => {
                self.repo_index = self.repo_index.saturating_sub(1);
            }
            Action::ScrollDown => {
                let len = self.session.visible().len();
                if len > 0 && self.repo_index < len - 1 {
                    self.repo_index += 1;
                }
            }
            Action::GoToTop => {
                self.repo_index = 0;
            }
            Action::GoToBottom => {
                self.repo_index = self.session.visible().len().saturating_sub(1);
            }

            Action::FocusUsername => {
                self.mode = InputMode::Username;
            }
            Action::UsernameInput(c) => {
                self.session.push_input(c);
                self.repo_index = 0;
            }
            Action::UsernameBackspace => {
                self.session.pop_input();
                self.repo_index = 0;
            }
            Action::ClearUsername => {
                self.session.set_input("");
                self.repo_index = 0;
            }
            Action::Submit => {
                self.repo_index = 0;
                let request = self.session.submit();
                if request.is_some() {
                    self.mode = InputMode::Browse;
                }
                self.dispatch(request);
            }

            Action::FocusFilter => {
                self.mode = InputMode::Filter;
            }
            Action::FilterInput(c) => {
                self.session.push_filter(c);
                self.repo_index = 0;
            }
            Action::FilterBackspace => {
                self.session.pop_filter();
                self.repo_index = 0;
            }
            Action::ClearFilter => {
                self.session.set_filter("");
                self.repo_index = 0;
            }

            Action::ExitInput => {
                self.mode = InputMode::Browse;
            }
            Action::Paste(text) => {
                let text: String = text.chars().filter(|c| !c.is_control()).collect();
                match self.mode {
                    InputMode::Username => {
                        let value = format!("{}{}", self.session.input(), text);
                        self.session.set_input(value);
                    }
                    InputMode::Filter => {
                        let value = format!("{}{}", self.session.filter(), text);
                        self.session.set_filter(value);
                    }
                    InputMode::Browse => {}
                }
                self.repo_index = 0;
            }

            Action::NextPage => {
                let request = self.session.next_page();
                self.dispatch(request);
            }
            Action::PrevPage => {
                let request = self.session.prev_page();
                self.dispatch(request);
            }
            Action::Refresh => {
                let request = self.session.refresh();
                self.dispatch(request);
            }

            Action::ProfileFetched { token, result } => {
                let request = self.session.profile_loaded(token, result);
                self.dispatch(request);
            }
            Action::ReposFetched { token, result } => {
                if self.session.repos_loaded(token, result) {
                    self.repo_index = 0;
                }
            }

            Action::OpenRepo => {
                if let Some(url) = self.selected_repo().map(|r| r.html_url.clone()) {
                    self.open_url(&url);
                }
            }
            Action::OpenProfile => {
                if let Some(url) = self.session.profile().map(|p| p.html_url.clone()) {
                    self.open_url(&url);
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_repo().map(|r| r.html_url.clone()) {
                    let copied = arboard::Clipboard::new().and_then(|mut c| c.set_text(url.clone()));
                    self.notice = Some(match copied {
                        Ok(()) => format!("Copied {}", url),
                        Err(e) => format!("Clipboard unavailable: {}", e),
                    });
                }
            }

            Action::Error(msg) => {
                self.notice = Some(msg);
            }
            Action::None => {}
        }
    }

    fn open_url(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            tracing::warn!(url, "failed to open browser: {}", e);
            self.update(TrackerError::from(e).into());
        }
    }

    fn dispatch(&self, request: Option<Request>) {
        let Some(request) = request else {
            return;
        };
        tracing::trace!(token = request.token(), "dispatching {:?}", request);
        match request {
            Request::Profile { token, username } => self.spawn_fetch_profile(token, username),
            Request::Repos {
                token,
                username,
                page,
                per_page,
            } => self.spawn_fetch_repos(token, username, page, per_page),
        }
    }

    fn spawn_fetch_profile(&self, token: u64, username: String) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let result = source.get_user(&username).await;
            tx.send(Action::ProfileFetched { token, result }).ok();
        });
    }

    fn spawn_fetch_repos(&self, token: u64, username: String, page: u32, per_page: u32) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let result = source.list_repos(&username, page, per_page).await;
            tx.send(Action::ReposFetched { token, result }).ok();
        });
    }
}
