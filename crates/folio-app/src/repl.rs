//! Line-oriented chat surface over a [`DialogueOrchestrator`].
//!
//! Reads commands from stdin, forwards them to the orchestrator and prints
//! whatever part of the session snapshot has not been shown yet.

use folio_chat::{
    ChatError, DialogueOrchestrator, DialogueTransport, Phase, QuickTopic, SessionSnapshot,
};
use folio_core::{Category, Role};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

const HELP: &str = "Commands:\n  <text>          ask a question (start with // to send a leading /)\n  /pick N         choose option N\n  /quick TOPIC    experience, projects, skills or contact\n  /reset          start a new conversation\n  /quit           exit\n";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Say(String),
    Pick(usize),
    Quick(QuickTopic),
    Reset,
    Help,
    Quit,
}

/// Parse an input line. Anything not starting with `/` is free text; a
/// leading `//` sends the rest of the line, one slash included, as text.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.starts_with("//") {
        return Ok(Command::Say(line[1..].to_string()));
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let arg = parts.next();
    match (name.as_str(), arg) {
        ("pick", Some(n)) => n
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(Command::Pick)
            .ok_or_else(|| format!("not an option number: {}", n)),
        ("pick", None) => Err("usage: /pick N".to_string()),
        ("quick", Some(topic)) => QuickTopic::parse(topic)
            .map(Command::Quick)
            .ok_or_else(|| format!("unknown topic: {}", topic)),
        ("quick", None) => Err("usage: /quick TOPIC".to_string()),
        ("reset", _) => Ok(Command::Reset),
        ("help", _) => Ok(Command::Help),
        ("quit" | "exit", _) => Ok(Command::Quit),
        _ => Err(format!("unknown command: /{}", name)),
    }
}

/// Tracks what has already been printed for the current session.
#[derive(Debug, Default)]
pub struct Renderer {
    session_id: Option<Uuid>,
    printed: usize,
}

impl Renderer {
    /// Render the unseen part of `snap`: new turns, then either the
    /// options to pick from or the quick-topic chips.
    pub fn render(&mut self, snap: &SessionSnapshot) -> String {
        if self.session_id != Some(snap.session_id) {
            self.session_id = Some(snap.session_id);
            self.printed = 0;
        }

        let mut out = String::new();
        for turn in &snap.turns[self.printed.min(snap.turns.len())..] {
            let who = match turn.role {
                Role::User => "you",
                Role::Assistant => "assistant",
            };
            out.push_str(&format!("{}> {}\n", who, turn.content));
        }
        self.printed = snap.turns.len();

        match snap.phase {
            Phase::AwaitingSelection => {
                out.push_str("Select what you'd like to explore:\n");
                let mut heading: Option<Category> = None;
                for (i, item) in snap.options.iter().enumerate() {
                    if heading != Some(item.category) {
                        heading = Some(item.category);
                        out.push_str(&format!("  {}\n", item.category.heading()));
                    }
                    out.push_str(&format!(
                        "    {}. {} ({})\n",
                        i + 1,
                        item.label,
                        item.period_or_meta
                    ));
                }
            }
            Phase::Ready if snap.accepts_free_text() => {
                let chips: Vec<String> = QuickTopic::ALL
                    .iter()
                    .map(|t| format!("[{}]", t.label()))
                    .collect();
                out.push_str(&format!("{}\n", chips.join(" ")));
            }
            Phase::Ready => {}
        }
        out
    }
}

/// Whether the loop should keep reading input.
#[derive(Debug, PartialEq)]
pub enum Step {
    Continue(Option<String>),
    Quit,
}

/// Apply one command. The returned notice, if any, is shown to the user.
pub async fn dispatch<T: DialogueTransport>(
    orch: &DialogueOrchestrator<T>,
    command: Command,
) -> Step {
    let result = match command {
        Command::Say(text) => orch.submit_free_text(&text).await.map(|_| ()),
        Command::Pick(n) => match n.checked_sub(1).and_then(|i| orch.options().get(i).cloned()) {
            Some(item) => orch.submit_selection(&item).await.map(|_| ()),
            None if orch.snapshot().phase == Phase::AwaitingSelection => {
                return Step::Continue(Some(format!("no option {}", n)));
            }
            None => Err(ChatError::NotAwaitingSelection),
        },
        Command::Quick(topic) => orch.submit_quick_topic(topic).map(|_| ()),
        Command::Reset => {
            orch.reset();
            Ok(())
        }
        Command::Help => return Step::Continue(Some(HELP.to_string())),
        Command::Quit => return Step::Quit,
    };

    match result {
        Ok(()) => Step::Continue(None),
        Err(ChatError::AwaitingSelection) => {
            Step::Continue(Some("pick one of the options with /pick N".to_string()))
        }
        Err(ChatError::EmptyMessage) => Step::Continue(None),
        Err(err) => Step::Continue(Some(err.to_string())),
    }
}

/// Run the interactive loop until `/quit` or end of input.
pub async fn run<T: DialogueTransport>(orch: DialogueOrchestrator<T>) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut renderer = Renderer::default();

    stdout
        .write_all(renderer.render(&orch.snapshot()).as_bytes())
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let step = match parse_command(&line) {
            Ok(command) => dispatch(&orch, command).await,
            Err(msg) => Step::Continue(Some(msg)),
        };

        match step {
            Step::Quit => break,
            Step::Continue(notice) => {
                if let Some(notice) = notice {
                    stdout.write_all(format!("({})\n", notice).as_bytes()).await?;
                }
                stdout
                    .write_all(renderer.render(&orch.snapshot()).as_bytes())
                    .await?;
            }
        }
    }
    Ok(())
}
