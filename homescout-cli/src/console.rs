use anyhow::Result;
use futures::StreamExt;
use homescout_runner::{CancellationToken, HandoffRouter, RouterEvent, TurnError, TurnResult};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

const SEPARATOR: &str = "--------------------------------------------------";

/// Renders one turn's events as console text.
pub struct TurnPrinter<W: Write> {
    out: W,
    streamed: bool,
}

impl<W: Write> TurnPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, streamed: false }
    }

    pub fn print(&mut self, item: &TurnResult<RouterEvent>) -> std::io::Result<()> {
        match item {
            Ok(event) => self.print_event(event),
            Err(err) => self.print_error(err),
        }
    }

    fn print_event(&mut self, event: &RouterEvent) -> std::io::Result<()> {
        match event {
            RouterEvent::RoleChanged { role, .. } => {
                self.streamed = false;
                writeln!(self.out, "\n[{role}]")?;
            }
            RouterEvent::TextDelta { text, .. } => {
                self.streamed = true;
                write!(self.out, "{text}")?;
            }
            RouterEvent::ToolCall { name, args, .. } => {
                writeln!(self.out, "Call '{name}' with arguments: {args}")?;
            }
            RouterEvent::ToolResult { .. } => {}
            RouterEvent::Handoff { from, to } => {
                writeln!(self.out, "\n{from} -> {to}")?;
            }
            RouterEvent::TurnComplete { text, .. } => {
                if !self.streamed {
                    write!(self.out, "{text}")?;
                }
                writeln!(self.out, "\n{SEPARATOR}")?;
            }
        }
        self.out.flush()
    }

    fn print_error(&mut self, err: &TurnError) -> std::io::Result<()> {
        writeln!(self.out, "\nError: {err}")?;
        writeln!(self.out, "{SEPARATOR}")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Read requests from the terminal until Ctrl+C or Ctrl+D at the prompt.
/// Ctrl+C while a turn is running cancels only that turn.
pub async fn run_console(router: &HandoffRouter) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("HomeScout");
    println!("Ask about the listed properties, or ask to translate the last results.");
    println!("Ctrl+C to exit.\n");

    loop {
        match rl.readline("User -> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;
                run_turn(router, line).await?;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }
    Ok(())
}

async fn run_turn(router: &HandoffRouter, line: &str) -> Result<()> {
    let cancel = CancellationToken::new();
    let mut turn = router.run_with_cancel(line, cancel.clone());
    let mut printer = TurnPrinter::new(std::io::stdout());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            item = turn.next() => match item {
                Some(item) => printer.print(&item)?,
                None => break,
            },
            _ = &mut ctrl_c, if !cancel.is_cancelled() => cancel.cancel(),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homescout_core::{RoleKind, ScoutError};
    use serde_json::json;

    fn render(items: Vec<TurnResult<RouterEvent>>) -> String {
        let mut printer = TurnPrinter::new(Vec::new());
        for item in &items {
            printer.print(item).unwrap();
        }
        String::from_utf8(printer.into_inner()).unwrap()
    }

    fn role_changed(role: &str, kind: RoleKind) -> TurnResult<RouterEvent> {
        Ok(RouterEvent::RoleChanged { role: role.into(), kind })
    }

    #[test]
    fn prints_roles_tool_calls_and_final_text() {
        let output = render(vec![
            role_changed("coordinator", RoleKind::Coordinator),
            Ok(RouterEvent::Handoff { from: "coordinator".into(), to: "retrieval".into() }),
            role_changed("retrieval", RoleKind::Retrieval),
            Ok(RouterEvent::ToolCall {
                role: "retrieval".into(),
                name: "search_listings".into(),
                args: json!({"question": "flats"}),
            }),
            role_changed("coordinator", RoleKind::Coordinator),
            Ok(RouterEvent::TurnComplete {
                role: "coordinator".into(),
                text: "Flat A has 3 rooms.".into(),
                hops: 3,
            }),
        ]);

        assert!(output.contains("[retrieval]"));
        assert!(output.contains(r#"Call 'search_listings' with arguments: {"question":"flats"}"#));
        assert!(output.contains("Flat A has 3 rooms."));
        assert!(output.trim_end().ends_with(SEPARATOR));
    }

    #[test]
    fn streamed_reply_is_not_printed_twice() {
        let output = render(vec![
            role_changed("coordinator", RoleKind::Coordinator),
            Ok(RouterEvent::TextDelta { role: "coordinator".into(), text: "Hel".into() }),
            Ok(RouterEvent::TextDelta { role: "coordinator".into(), text: "lo".into() }),
            Ok(RouterEvent::TurnComplete {
                role: "coordinator".into(),
                text: "Hello".into(),
                hops: 1,
            }),
        ]);
        assert_eq!(output.matches("Hello").count(), 1);
    }

    #[test]
    fn errors_end_the_turn_with_a_separator() {
        let output = render(vec![
            role_changed("coordinator", RoleKind::Coordinator),
            Err(TurnError::RoleExecutionFault {
                role: "translation".into(),
                source: ScoutError::Model("HTTP 500".into()),
            }),
        ]);
        assert!(output.contains("Error: role 'translation' failed: Model error: HTTP 500"));
        assert!(output.trim_end().ends_with(SEPARATOR));
    }
}
