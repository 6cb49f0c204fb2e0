use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::{input_box, truncate};
use crate::action::InputMode;
use crate::app::App;
use crate::session::RepoView;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let filter = input_box(
        " Filter by name ",
        app.session.filter(),
        app.mode == InputMode::Filter,
    );
    frame.render_widget(filter, chunks[0]);

    render_list(frame, app, chunks[1]);
    render_pagination(frame, app, chunks[2]);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    // Total from the profile, not the page length
    let total = app.session.profile().map(|p| p.public_repos).unwrap_or(0);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Repositories ({})", total));

    let repos = match app.session.view() {
        RepoView::Repos(repos) => repos,
        _ if app.session.repos_status().is_loading() || app.session.profile().is_none() => {
            frame.render_widget(block, area);
            return;
        }
        RepoView::NoMatches(term) => {
            let empty = Paragraph::new(format!("No repositories found matching \"{}\".", term))
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(empty, area);
            return;
        }
        RepoView::NoRepositories => {
            let empty = Paragraph::new("No public repositories found for this user.")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(empty, area);
            return;
        }
    };

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 68; // name(28) + stars(7) + forks(6) + lang(12) + date(10) + spaces(5)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = repos
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let style = if i == app.repo_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let description = repo
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("No description provided.");

            let line = Line::from(vec![
                Span::styled(format!("{:<28}", truncate(&repo.name, 28)), style),
                Span::raw(" "),
                Span::styled(
                    format!("★ {:>5}", repo.stargazers_count),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("⑂ {:>4}", repo.forks_count),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<12}", truncate(repo.language.as_deref().unwrap_or(""), 12)),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    repo.updated_at.format("%Y-%m-%d").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw("  "),
                Span::styled(
                    truncate(description, flex),
                    Style::default().fg(Color::Gray),
                ),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.repo_index));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_pagination(frame: &mut Frame, app: &App, area: Rect) {
    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray);
    let session = &app.session;

    let line = Line::from(vec![
        Span::styled(
            "◀ Previous",
            if session.can_prev() { enabled } else { disabled },
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Page {}", session.cursor().page),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled("Next ▶", if session.can_next() { enabled } else { disabled }),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
