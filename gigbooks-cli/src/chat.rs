//! Interactive chat screen for the assistant.
//!
//! One prompt is processed at a time: the router answers from stored data
//! first, and the model is asked only when no intent matches. Replies land
//! in the visible history immediately; a failed conversation save goes to
//! the session log, while a failed model call is shown to the user.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{Stdout, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use gigbooks_core::types::UserProfile;
use gigbooks_ledger::{Ledger, answer_prompt};

use crate::llm;

const HISTORY_CONTEXT_TURNS: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Speaker {
    You,
    Assistant,
    Notice,
}

impl Speaker {
    fn style(self) -> (&'static str, Color) {
        match self {
            Speaker::You => ("you", Color::Cyan),
            Speaker::Assistant => ("gigbooks", Color::Green),
            Speaker::Notice => ("!", Color::Red),
        }
    }
}

struct Screen {
    title: String,
    history: Vec<(Speaker, String)>,
    input: String,
    waiting: bool,
}

impl Screen {
    fn say(&mut self, who: Speaker, text: impl Into<String>) {
        self.history.push((who, text.into()));
    }

    fn draw(&self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(3)])
            .split(frame.area());

        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                self.title.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  (Enter sends, Esc quits, /help for commands)",
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        frame.render_widget(title, rows[0]);

        let mut lines: Vec<Line> = Vec::with_capacity(self.history.len() * 2);
        for (who, text) in &self.history {
            let (tag, color) = who.style();
            lines.push(Line::from(vec![
                Span::styled(format!("{tag} "), Style::default().fg(color)),
                Span::raw(text.clone()),
            ]));
            lines.push(Line::raw(""));
        }

        // Keep the tail of the conversation on screen.
        let visible = rows[1].height.saturating_sub(2) as usize;
        let scroll = lines.len().saturating_sub(visible) as u16;

        let history = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(history, rows[1]);

        let prompt_title = if self.waiting { "thinking..." } else { "ask about your books" };
        let input = Paragraph::new(self.input.as_str())
            .block(Block::default().borders(Borders::ALL).title(prompt_title));
        frame.render_widget(input, rows[2]);
    }
}

/// Daily session log under `~/.gigbooks/chat/`. Persistence failures in
/// the ledger are recorded here rather than shown mid-conversation.
struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    fn open() -> Result<Self> {
        let dir = crate::state::ensure_gigbooks_home()?.join("chat");
        std::fs::create_dir_all(&dir)?;
        let day = chrono::Utc::now().format("%Y-%m-%d");
        Ok(Self { path: dir.join(format!("{day}.log")) })
    }

    fn note(&self, who: &str, text: &str) {
        let entry = format!(
            "{} {who}: {}\n",
            chrono::Utc::now().to_rfc3339(),
            text.replace('\n', " ")
        );
        if let Ok(mut f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = f.write_all(entry.as_bytes());
        }
    }
}

pub fn run_chat(ledger: &mut Ledger, user: &UserProfile, today: NaiveDate) -> Result<()> {
    enable_raw_mode()?;
    execute!(std::io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;

    let outcome = chat_loop(&mut terminal, ledger, user, today);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome
}

fn chat_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ledger: &mut Ledger,
    user: &UserProfile,
    today: NaiveDate,
) -> Result<()> {
    let log = SessionLog::open()?;
    log.note("session", "start");

    let mut screen = Screen {
        title: format!("gigbooks — {}", user.business),
        history: Vec::new(),
        input: String::new(),
        waiting: false,
    };

    // Replay persisted turns, oldest first.
    for turn in ledger.conversations_for(&user.id) {
        screen.history.push((Speaker::You, turn.prompt.clone()));
        screen.history.push((Speaker::Assistant, turn.response.clone()));
    }
    if screen.history.is_empty() {
        screen.say(
            Speaker::Assistant,
            format!(
                "Hi {} — ask me about your invoices, expenses, or income.",
                user.fullname
            ),
        );
    }

    loop {
        terminal.draw(|f| screen.draw(f))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => break,
            KeyCode::Backspace => {
                screen.input.pop();
            }
            KeyCode::Char(c) => screen.input.push(c),
            KeyCode::Enter => {
                let prompt = screen.input.trim().to_string();
                screen.input.clear();
                if prompt.is_empty() || screen.waiting {
                    continue;
                }

                log.note("you", &prompt);

                if let Some(text) = slash_command(&prompt) {
                    screen.say(Speaker::Assistant, text);
                    continue;
                }

                screen.say(Speaker::You, prompt.clone());
                screen.waiting = true;
                terminal.draw(|f| screen.draw(f))?;

                match respond(ledger, user, &screen.history, &prompt, today) {
                    Ok(reply) => {
                        log.note("gigbooks", &reply);
                        ledger.add_conversation(
                            &user.id,
                            &prompt,
                            &reply,
                            &chrono::Utc::now().to_rfc3339(),
                        );
                        if let Err(e) = ledger.save() {
                            log.note("session", &format!("save failed: {e}"));
                        }
                        screen.say(Speaker::Assistant, reply);
                    }
                    Err(e) => {
                        log.note("session", &format!("model call failed: {e}"));
                        screen.say(
                            Speaker::Notice,
                            "Couldn't get a response — please try again.",
                        );
                    }
                }
                screen.waiting = false;
            }
            _ => {}
        }
    }

    log.note("session", "end");
    Ok(())
}

/// Router first; the model only sees prompts the router declined, along
/// with a short window of recent conversation.
fn respond(
    ledger: &Ledger,
    user: &UserProfile,
    history: &[(Speaker, String)],
    prompt: &str,
    today: NaiveDate,
) -> Result<String> {
    if let Some(answer) = answer_prompt(ledger, &user.id, prompt, today)? {
        return Ok(answer);
    }

    let Some(model) = llm::Fallback::from_saved()? else {
        anyhow::bail!(
            "no model configured; run: gigbooks auth paste-anthropic-token (or paste-openai-api-key)"
        );
    };

    let mut turns: Vec<llm::ChatTurn> = Vec::new();
    let start = history.len().saturating_sub(HISTORY_CONTEXT_TURNS);
    for (who, text) in &history[start..] {
        match who {
            Speaker::You => turns.push(llm::ChatTurn::user(text.clone())),
            Speaker::Assistant => turns.push(llm::ChatTurn::assistant(text.clone())),
            Speaker::Notice => {}
        }
    }
    // The pending prompt is already the last "you" entry in history, so
    // only append it when the window cut it off.
    if !matches!(turns.last(), Some(t) if t.role == "user" && t.content == prompt) {
        turns.push(llm::ChatTurn::user(prompt));
    }

    model.complete(&llm::assistant_system_prompt(Some(user)), &turns)
}

fn slash_command(input: &str) -> Option<String> {
    if !input.starts_with('/') {
        return None;
    }
    match input {
        "/help" => Some(
            "Ask about your data: overdue invoices, income by month, sales, expenses, \
or \"predict my income\". Anything else goes to the assistant model.\n\
Commands: /help /where\n\
Keys: Enter sends, Esc quits"
                .to_string(),
        ),
        "/where" => Some(
            "Your books live in ~/.gigbooks/books.json; session logs in ~/.gigbooks/chat/."
                .to_string(),
        ),
        _ => Some("Unknown command. Try /help".to_string()),
    }
}
