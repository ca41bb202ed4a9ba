use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use avl_drill::command::{self, Command, HELP};
use avl_drill::{Engine, Grid, Marker, Mode, Payload, Response, SessionConfig, Status};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "avl-drill", about = "Practice AVL tree insertions, deletions and rotations")]
struct Cli {
    /// Balancing mode: automatic or practice.
    #[arg(long, default_value_t = Mode::Automatic)]
    mode: Mode,
    /// Do not show intermediate trees while auto-balancing.
    #[arg(long)]
    no_steps: bool,
    /// Do not print the tree after every change.
    #[arg(long)]
    no_autoshow: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive session reading commands from stdin (default).
    Repl,
    /// Execute a command script, one or more commands per line.
    Run {
        /// Script file.
        script: PathBuf,
        /// Stop at the first rejected command.
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = SessionConfig {
        mode: cli.mode,
        show_steps: !cli.no_steps,
        auto_show: !cli.no_autoshow,
    };
    let stdout = io::stdout();
    let mut session = Session::new(Engine::new(config), stdout.lock());

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => run_repl(&mut session)?,
        Commands::Run { script, strict } => run_script(&mut session, script, strict)?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_repl<W: Write>(session: &mut Session<W>) -> Result<()> {
    session.banner()?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        session.prompt()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;
        if session.run_line(&line)? == Flow::Exit {
            break;
        }
    }
    Ok(())
}

fn run_script<W: Write>(session: &mut Session<W>, path: PathBuf, strict: bool) -> Result<()> {
    let reader = BufReader::new(
        File::open(&path).with_context(|| format!("failed to open script {}", path.display()))?,
    );
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        session.echo(trimmed)?;
        match session.run_line(trimmed)? {
            Flow::Exit => break,
            Flow::Rejected if strict => {
                anyhow::bail!("{}:{}: command rejected", path.display(), idx + 1)
            }
            Flow::Continue | Flow::Rejected => {}
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Rejected,
    Exit,
}

/// Engine plus the text reporter around it
struct Session<W: Write> {
    engine: Engine,
    out: W,
}

impl<W: Write> Session<W> {
    fn new(engine: Engine, out: W) -> Self {
        Self { engine, out }
    }

    fn banner(&mut self) -> Result<()> {
        let config = self.engine.config();
        writeln!(self.out, "AVL Tree Practice Tool")?;
        writeln!(self.out, "Mode: {}", config.mode)?;
        writeln!(self.out, "Auto-show tree: {}", on_off(config.auto_show))?;
        writeln!(self.out, "Show steps: {}", on_off(config.show_steps))?;
        writeln!(self.out, "Type 'help' for commands.")?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "> ")?;
        self.out.flush().context("failed to flush stdout")
    }

    fn echo(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "> {line}")?;
        Ok(())
    }

    fn run_line(&mut self, line: &str) -> Result<Flow> {
        let commands = match command::parse_line(line) {
            Ok(commands) => commands,
            Err(err) => {
                writeln!(self.out, "error: {err}")?;
                return Ok(Flow::Rejected);
            }
        };

        let mut flow = Flow::Continue;
        for command in commands {
            match command {
                Command::Engine(request) => {
                    let response = self.engine.handle(request);
                    let show_tree =
                        response.success && request.is_mutation() && self.engine.config().auto_show;
                    self.report(&response)?;
                    if show_tree {
                        let grid = self.engine.render();
                        self.show_grid(&grid)?;
                    }
                    if !response.success {
                        flow = Flow::Rejected;
                    }
                }
                Command::Help => write!(self.out, "{HELP}")?,
                Command::Clear => {
                    write!(self.out, "\x1b[2J\x1b[H")?;
                    self.banner()?;
                }
                Command::Exit => return Ok(Flow::Exit),
            }
        }
        Ok(flow)
    }

    fn report(&mut self, response: &Response) -> Result<()> {
        let prefix = if response.success { "" } else { "error: " };
        for message in &response.messages {
            writeln!(self.out, "{prefix}{message}")?;
        }
        for frame in &response.frames {
            writeln!(self.out, "{}:", frame.label)?;
            self.show_grid(&avl_drill::render(&frame.tree))?;
        }
        match &response.payload {
            Some(Payload::Grid(grid)) => self.show_grid(grid)?,
            Some(Payload::Status(status)) => self.show_status(status)?,
            // Traversals and hints are already in the messages
            Some(Payload::Traversal(_)) | Some(Payload::Hint(_)) | None => {}
        }
        Ok(())
    }

    fn show_grid(&mut self, grid: &Grid) -> Result<()> {
        write!(self.out, "{grid}")?;
        let emphasized = grid.emphasized();
        if emphasized.is_empty() {
            return Ok(());
        }
        let list = |marker: Marker| {
            emphasized
                .iter()
                .filter(|(_, m)| *m == marker)
                .map(|(v, _)| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let added = list(Marker::RecentlyAdded);
        let unbalanced = list(Marker::Unbalanced);
        if !added.is_empty() {
            writeln!(self.out, "  recently added: {added}")?;
        }
        if !unbalanced.is_empty() {
            writeln!(self.out, "  unbalanced (needs rotation): {unbalanced}")?;
        }
        Ok(())
    }

    fn show_status(&mut self, status: &Status) -> Result<()> {
        writeln!(self.out, "Mode: {}", status.mode)?;
        writeln!(self.out, "Auto-show tree: {}", on_off(self.engine.config().auto_show))?;
        writeln!(self.out, "Show steps: {}", on_off(self.engine.config().show_steps))?;
        writeln!(self.out, "Nodes: {}  Height: {}", status.size, status.height)?;
        match status.violation {
            Some(violation) => writeln!(self.out, "Balance: unbalanced, {violation}")?,
            None => writeln!(self.out, "Balance: balanced")?,
        }
        if let Some(step) = status.pending {
            writeln!(self.out, "Pending: {step}")?;
        }
        writeln!(
            self.out,
            "Undo: {}  Redo: {}",
            yes_no(status.can_undo),
            yes_no(status.can_redo)
        )?;
        Ok(())
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
