//! The interactive session loop.
//!
//! Pulls physical lines from the line source, accumulates them into logical
//! statements, and routes each completed statement to the query executor, a
//! nested sub-shell, or a named external command. One statement is fully
//! processed before the next line is read; every error below the loop is
//! contained and reported, and only an explicit `exit`/`quit` (or an
//! unrecoverable line source failure) ends the session.

use std::io::Write;
use std::pin::Pin;
use std::process::Command;
use std::time::{Duration, Instant};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};

use crate::accumulator::should_submit;
use crate::error::{Result, ShellError};
use crate::executor::StatementExecutor;
use crate::formatter::ResultFormatter;
use crate::history::CommandHistory;
use crate::parser::{classify, DispatchTarget};
use crate::preprocess::{preprocess, ShellControl, CLEAR_SEQUENCE};
use crate::prompt::render_prompt;

/// Nested `\` sub-shells beyond this depth are refused.
pub const MAX_SHELL_DEPTH: usize = 8;

/// Resolved operator identity.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: String,
    pub password: String,
}

impl Actor {
    /// Resolve identity from explicit values, then the environment, then the
    /// fixed defaults.
    pub fn resolve(user: Option<String>, password: Option<String>) -> Self {
        let user = user
            .or_else(|| std::env::var("MERIDIAN_USER").ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| "sys".to_string());
        let password = password
            .or_else(|| {
                std::env::var("MERIDIAN_PASSWORD")
                    .ok()
                    .filter(|v| !v.is_empty())
            })
            .unwrap_or_else(|| "manager".to_string());
        Self { user, password }
    }
}

/// Per-shell state: the actor identity, the physical lines buffered for the
/// statement in progress, and the continuation index used for prompt
/// selection. Constructed once per shell level and passed explicitly to the
/// loop.
#[derive(Debug)]
pub struct ShellState {
    pub actor: Actor,
    depth: usize,
    buffer: Vec<String>,
    line_index: usize,
}

impl ShellState {
    pub fn new(actor: Actor) -> Self {
        Self::nested(actor, 0)
    }

    fn nested(actor: Actor, depth: usize) -> Self {
        Self {
            actor,
            depth,
            buffer: Vec::new(),
            line_index: 0,
        }
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.line_index = 0;
    }
}

/// One read from the line source.
#[derive(Debug)]
pub enum ReadEvent {
    Line(String),

    /// Ctrl-C: discard the statement in progress
    Interrupted,

    /// Ctrl-D / end of input
    Eof,
}

/// Supplies one physical line of raw operator input per call.
pub trait LineSource {
    /// Blocking read of one line under the given prompt
    fn read_line(&mut self, prompt: &str) -> Result<ReadEvent>;

    /// Push an accepted statement into the editor's in-memory recall
    fn remember(&mut self, _line: &str) {}
}

/// Line source backed by a rustyline editor.
pub struct ReadlineSource {
    editor: DefaultEditor,
}

impl ReadlineSource {
    pub fn new() -> Result<Self> {
        let config = Config::builder().auto_add_history(false).build();
        let editor =
            DefaultEditor::with_config(config).map_err(|e| ShellError::Input(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl LineSource for ReadlineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadEvent::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadEvent::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadEvent::Eof),
            Err(err) => Err(ShellError::Input(err.to_string())),
        }
    }

    fn remember(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

/// Presentation switches for one session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub color: bool,
    pub spinner: bool,
    pub timing: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            color: true,
            spinner: true,
            timing: false,
        }
    }
}

/// The outer driver of the shell.
pub struct ShellSession<E: StatementExecutor> {
    executor: E,
    history: CommandHistory,
    formatter: ResultFormatter,
    options: SessionOptions,
}

impl<E: StatementExecutor> ShellSession<E> {
    pub fn new(executor: E, history: CommandHistory, options: SessionOptions) -> Self {
        Self {
            executor,
            history,
            formatter: ResultFormatter::new(),
            options,
        }
    }

    /// Run the loop until an explicit `exit`/`quit`. Returns the exit code
    /// of the terminating statement.
    pub async fn run<L: LineSource>(
        &mut self,
        state: &mut ShellState,
        lines: &mut L,
    ) -> Result<i32> {
        let mut input_failures = 0u32;
        loop {
            let prompt = render_prompt(&state.actor, state.line_index, self.options.color);
            let event = match lines.read_line(&prompt) {
                Ok(event) => {
                    input_failures = 0;
                    event
                }
                // a lone input error is reported and the loop continues; a
                // repeated one means the source is gone
                Err(err) => {
                    input_failures += 1;
                    if input_failures > 1 {
                        return Err(err);
                    }
                    self.report(&err);
                    continue;
                }
            };
            let line = match event {
                ReadEvent::Line(line) => line,
                ReadEvent::Interrupted => {
                    if !state.buffer.is_empty() {
                        self.notice("statement cancelled");
                    }
                    state.reset();
                    continue;
                }
                ReadEvent::Eof => {
                    self.notice("bye");
                    return Ok(0);
                }
            };

            if line.trim().is_empty() && state.buffer.is_empty() {
                continue;
            }

            state.buffer.push(line);
            let just_entered = state.buffer.len() - 1;
            if !should_submit(&state.buffer, just_entered) {
                state.line_index += 1;
                continue;
            }

            let submitted = state.buffer.join(" ");
            let actor = state.actor.clone();
            let depth = state.depth;
            state.reset();

            match preprocess(&submitted) {
                ShellControl::Terminate(code) => return Ok(code),
                ShellControl::Clear => {
                    print!("{}", CLEAR_SEQUENCE);
                    let _ = std::io::stdout().flush();
                }
                ShellControl::Statement(normalized) => {
                    if normalized.is_empty() {
                        continue;
                    }
                    lines.remember(&submitted);
                    if let Err(err) = self.history.append(&submitted) {
                        self.report(&err);
                    }
                    if let Err(err) = self.dispatch(&normalized, &actor, depth, lines).await {
                        self.report(&err);
                    }
                }
            }
        }
    }

    /// Execute a single pre-assembled command line, bypassing prompt,
    /// accumulator, and history (the non-interactive invocation path).
    /// Returns the process exit code.
    pub async fn process_once<L: LineSource>(
        &mut self,
        state: &mut ShellState,
        lines: &mut L,
        command: &str,
    ) -> Result<i32> {
        match preprocess(command) {
            ShellControl::Terminate(code) => Ok(code),
            ShellControl::Clear => {
                print!("{}", CLEAR_SEQUENCE);
                let _ = std::io::stdout().flush();
                Ok(0)
            }
            ShellControl::Statement(normalized) => {
                if normalized.is_empty() {
                    return Ok(0);
                }
                let actor = state.actor.clone();
                match self.dispatch(&normalized, &actor, state.depth, lines).await {
                    Ok(()) => Ok(0),
                    Err(err) => {
                        self.report(&err);
                        Ok(1)
                    }
                }
            }
        }
    }

    /// Classify one normalized statement and invoke exactly one target.
    async fn dispatch<L: LineSource>(
        &mut self,
        statement: &str,
        actor: &Actor,
        depth: usize,
        lines: &mut L,
    ) -> Result<()> {
        let Some(target) = classify(statement)? else {
            return Ok(());
        };

        match target {
            DispatchTarget::Query(sql) => self.run_query(&sql).await,
            DispatchTarget::NestedShell(_fields) => {
                self.run_nested_shell(actor, depth, lines).await
            }
            DispatchTarget::Command { name, args } => self.run_command(&name, &args),
        }
    }

    async fn run_query(&mut self, sql: &str) -> Result<()> {
        let started = Instant::now();

        let spinner = if self.options.spinner {
            Some(Self::create_spinner())
        } else {
            None
        };
        let result = self.executor.execute(sql).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let outcome = result?;
        println!("{}", self.formatter.render(&outcome));
        if self.options.timing {
            println!("Elapsed time: {:.3}s", started.elapsed().as_secs_f64());
        }
        Ok(())
    }

    async fn run_nested_shell<L: LineSource>(
        &mut self,
        actor: &Actor,
        depth: usize,
        lines: &mut L,
    ) -> Result<()> {
        if depth + 1 > MAX_SHELL_DEPTH {
            return Err(ShellError::Dispatch(format!(
                "nested shell depth limit ({}) reached",
                MAX_SHELL_DEPTH
            )));
        }

        let mut state = ShellState::nested(actor.clone(), depth + 1);
        let nested: Pin<Box<dyn std::future::Future<Output = Result<i32>> + '_>> =
            Box::pin(self.run(&mut state, lines));
        let code = nested.await?;
        self.notice(&format!("nested shell exited (code {})", code));
        Ok(())
    }

    fn run_command(&self, name: &str, args: &[String]) -> Result<()> {
        let status = Command::new(name)
            .args(args)
            .status()
            .map_err(|e| ShellError::Dispatch(format!("{}: {}", name, e)))?;

        if !status.success() {
            let detail = status
                .code()
                .map_or_else(|| "signal".to_string(), |code| format!("code {}", code));
            return Err(ShellError::Dispatch(format!(
                "{} exited with {}",
                name, detail
            )));
        }
        Ok(())
    }

    fn create_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("executing...");
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn report(&self, err: &ShellError) {
        if self.options.color {
            eprintln!("{} {}", "✗".red(), err);
        } else {
            eprintln!("✗ {}", err);
        }
    }

    fn notice(&self, message: &str) {
        if self.options.color {
            println!("{}", message.yellow());
        } else {
            println!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_link::QueryOutcome;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use tempfile::tempdir;

    struct ScriptedSource {
        events: VecDeque<Result<ReadEvent>>,
        prompts: Vec<String>,
        remembered: Vec<String>,
    }

    impl ScriptedSource {
        fn new(lines: &[&str]) -> Self {
            Self {
                events: lines
                    .iter()
                    .map(|l| Ok(ReadEvent::Line(l.to_string())))
                    .collect(),
                prompts: Vec::new(),
                remembered: Vec::new(),
            }
        }
    }

    impl LineSource for ScriptedSource {
        fn read_line(&mut self, prompt: &str) -> Result<ReadEvent> {
            self.prompts.push(prompt.to_string());
            self.events.pop_front().unwrap_or(Ok(ReadEvent::Eof))
        }

        fn remember(&mut self, line: &str) {
            self.remembered.push(line.to_string());
        }
    }

    #[derive(Clone)]
    struct RecordingExecutor {
        statements: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl RecordingExecutor {
        fn new() -> Self {
            Self {
                statements: Rc::new(RefCell::new(Vec::new())),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                statements: Rc::new(RefCell::new(Vec::new())),
                fail: true,
            }
        }
    }

    impl StatementExecutor for RecordingExecutor {
        async fn execute(&self, statement: &str) -> Result<QueryOutcome> {
            self.statements.borrow_mut().push(statement.to_string());
            if self.fail {
                Err(ShellError::Dispatch("executor unavailable".into()))
            } else {
                Ok(QueryOutcome {
                    columns: vec![],
                    rows: vec![],
                    message: Some("ok".into()),
                    reason: None,
                })
            }
        }
    }

    fn options() -> SessionOptions {
        SessionOptions {
            color: false,
            spinner: false,
            timing: false,
        }
    }

    fn actor() -> Actor {
        Actor {
            user: "sys".into(),
            password: "manager".into(),
        }
    }

    #[test]
    fn test_actor_explicit_values_win() {
        let resolved = Actor::resolve(Some("alice".into()), Some("secret".into()));
        assert_eq!(resolved.user, "alice");
        assert_eq!(resolved.password, "secret");
    }

    #[tokio::test]
    async fn test_multi_line_statement_dispatches_once() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());
        let mut lines = ScriptedSource::new(&["SELECT * FROM t", "WHERE x=1;", "exit"]);

        let code = session.run(&mut state, &mut lines).await.unwrap();
        assert_eq!(code, 0);

        let statements = executor.statements.borrow();
        assert_eq!(*statements, vec!["SELECT * FROM t WHERE x=1"]);

        let recorded = CommandHistory::with_path(dir.path().join("history"), 100)
            .load()
            .unwrap();
        assert_eq!(recorded, vec!["SELECT * FROM t WHERE x=1;"]);

        // primary prompt, continuation prompt, primary prompt again
        assert_eq!(lines.prompts[0], "sys meridian» ");
        assert_eq!(lines.prompts[1], ">  ");
        assert_eq!(lines.prompts[2], "sys meridian» ");
    }

    #[tokio::test]
    async fn test_dispatch_failure_returns_to_primary_prompt() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::failing();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());
        let mut lines = ScriptedSource::new(&["select 1;", "exit"]);

        let code = session.run(&mut state, &mut lines).await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(executor.statements.borrow().len(), 1);
        assert_eq!(lines.prompts[1], lines.prompts[0]);
        assert_eq!(state.line_index(), 0);
    }

    #[tokio::test]
    async fn test_exit_is_case_insensitive_and_skips_history() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());
        let mut lines = ScriptedSource::new(&["QUIT"]);

        let code = session.run(&mut state, &mut lines).await.unwrap();
        assert_eq!(code, 0);
        assert!(executor.statements.borrow().is_empty());
        assert!(CommandHistory::with_path(dir.path().join("history"), 100)
            .load()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_clear_discards_statement() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());
        let mut lines = ScriptedSource::new(&["clear;", "exit"]);

        session.run(&mut state, &mut lines).await.unwrap();
        assert!(executor.statements.borrow().is_empty());
        assert!(lines.remembered.is_empty());
    }

    #[tokio::test]
    async fn test_empty_line_is_skipped() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());
        let mut lines = ScriptedSource::new(&["", "exit"]);

        let code = session.run(&mut state, &mut lines).await.unwrap();
        assert_eq!(code, 0);
        assert!(executor.statements.borrow().is_empty());
        assert_eq!(lines.prompts.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_command_is_contained() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());
        let mut lines =
            ScriptedSource::new(&["\\no-such-meridian-command-xyz", "select 1;", "exit"]);

        let code = session.run(&mut state, &mut lines).await.unwrap();
        assert_eq!(code, 0);
        // the failed dispatch did not stop the loop
        assert_eq!(*executor.statements.borrow(), vec!["select 1"]);
    }

    #[tokio::test]
    async fn test_nested_shell_exit_returns_to_parent() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());
        let mut lines = ScriptedSource::new(&["\\", "exit", "select 1;", "exit"]);

        let code = session.run(&mut state, &mut lines).await.unwrap();
        assert_eq!(code, 0);
        // the statement after the nested exit ran in the parent shell
        assert_eq!(*executor.statements.borrow(), vec!["select 1"]);
        assert_eq!(lines.prompts.len(), 4);
    }

    #[tokio::test]
    async fn test_interrupt_discards_buffered_statement() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());

        let mut lines = ScriptedSource::new(&["select * from t"]);
        lines.events.push_back(Ok(ReadEvent::Interrupted));
        lines.events.push_back(Ok(ReadEvent::Line("exit".into())));

        let code = session.run(&mut state, &mut lines).await.unwrap();
        assert_eq!(code, 0);
        assert!(executor.statements.borrow().is_empty());
        // after the interrupt the prompt is primary again
        assert_eq!(lines.prompts[2], lines.prompts[0]);
    }

    #[tokio::test]
    async fn test_single_input_error_is_contained() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());

        let mut lines = ScriptedSource::new(&["select 1;", "exit"]);
        lines
            .events
            .push_front(Err(ShellError::Input("stream glitch".into())));

        let code = session.run(&mut state, &mut lines).await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(*executor.statements.borrow(), vec!["select 1"]);
    }

    #[tokio::test]
    async fn test_repeated_input_errors_end_the_loop() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::new();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());

        let mut lines = ScriptedSource::new(&[]);
        lines
            .events
            .push_back(Err(ShellError::Input("stream gone".into())));
        lines
            .events
            .push_back(Err(ShellError::Input("stream gone".into())));

        let err = session.run(&mut state, &mut lines).await.unwrap_err();
        assert!(err.to_string().contains("stream gone"));
    }

    #[tokio::test]
    async fn test_process_once_reports_failure_as_exit_code() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100);
        let executor = RecordingExecutor::failing();
        let mut session = ShellSession::new(executor.clone(), history, options());
        let mut state = ShellState::new(actor());
        let mut lines = ScriptedSource::new(&[]);

        let code = session
            .process_once(&mut state, &mut lines, "select 1;")
            .await
            .unwrap();
        assert_eq!(code, 1);
        assert_eq!(*executor.statements.borrow(), vec!["select 1"]);
    }
}
