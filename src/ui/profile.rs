use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<12}", label),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(value),
    ])
}

fn or_na(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("N/A")
        .to_string()
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Profile ");

    let Some(profile) = app.session.profile() else {
        let hint = match app.session.username() {
            Some(username) if app.session.profile_status().is_loading() => {
                format!("Fetching profile for {}...", username)
            }
            _ => "Enter a username and press Enter".to_string(),
        };
        let empty = Paragraph::new(hint)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let lines = vec![
        Line::from(Span::styled(
            profile.display_name().to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("@{}", profile.login),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        field("Name", or_na(profile.name.as_deref())),
        field("Bio", or_na(profile.bio.as_deref())),
        field("Followers", profile.followers.to_string()),
        field("Following", profile.following.to_string()),
        field("Public repos", profile.public_repos.to_string()),
        field("Location", or_na(profile.location.as_deref())),
        Line::from(""),
        field("Profile", profile.html_url.clone()),
        field("Avatar", or_na(profile.avatar_url.as_deref())),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
