//! Headless Inkboard client: joins a shared board and inspects or edits it.

mod app;
mod svg;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use inkboard_core::config::{DEFAULT_BOARD, DEFAULT_SERVER_URL};
use inkboard_core::{
    Instant, MouseButton, PointerEvent, SerializableColor, SyncConfig, SyncError, ToolKind,
};
use inkboard_render::{RendererError, render_export};
use kurbo::Point;

use crate::app::Replica;
use crate::svg::SvgCanvas;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),
    #[error("render failed: {0}")]
    Render(#[from] RendererError),
    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode board: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "inkboard", about = "Collaborative whiteboard replica client")]
struct Cli {
    #[arg(long, env = "INKBOARD_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[arg(long, env = "INKBOARD_BOARD", default_value = DEFAULT_BOARD)]
    board: String,

    #[arg(long, env = "INKBOARD_NAME")]
    name: Option<String>,

    /// Seconds to keep syncing after joining, before acting on the board.
    #[arg(long, default_value_t = 2)]
    wait: u64,

    /// Seconds between reconnection attempts.
    #[arg(long)]
    reconnect_delay: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the board and log activity.
    Watch {
        #[arg(long, default_value_t = 30)]
        seconds: u64,
    },
    /// Print every item on the board as JSON.
    Snapshot,
    /// Render the board to an SVG file.
    Export {
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Draw a two-point shape.
    Shape {
        #[arg(value_enum)]
        kind: ShapeKind,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[arg(long, default_value = "#ffffff")]
        color: String,
        #[arg(long, default_value_t = 2.0)]
        width: f64,
    },
    /// Place a text label.
    Text { x: f64, y: f64, text: String },
    /// Remove the most recent item on the board.
    Undo,
    /// Remove everything from the board.
    Clear,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    Arrow,
}

impl From<ShapeKind> for ToolKind {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rectangle => ToolKind::Rectangle,
            ShapeKind::Circle => ToolKind::Circle,
            ShapeKind::Line => ToolKind::Line,
            ShapeKind::Arrow => ToolKind::Arrow,
        }
    }
}

impl Cli {
    fn sync_config(&self) -> SyncConfig {
        let mut config = SyncConfig::new(self.server.clone(), self.board.clone());
        if let Some(name) = &self.name {
            config = config.with_user_name(name.clone());
        }
        if let Some(secs) = self.reconnect_delay {
            config.reconnect_delay = Duration::from_secs(secs);
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Inkboard");

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut board = app::join(cli.sync_config())?;
    app::settle(&mut board, Duration::from_secs(cli.wait));

    match cli.command {
        Command::Watch { seconds } => watch(&mut board, seconds),
        Command::Snapshot => {
            println!("{}", serde_json::to_string_pretty(&board.store().snapshot())?);
        }
        Command::Export { output } => export(&board, &output)?,
        Command::Shape {
            kind,
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            let controller = board.controller_mut();
            controller.set_color(SerializableColor::from_hex(&color).unwrap_or_default());
            controller.set_stroke_width(width);
            app::draw_shape(
                &mut board,
                kind.into(),
                Point::new(x1, y1),
                Point::new(x2, y2),
            );
        }
        Command::Text { x, y, text } => {
            board.controller_mut().set_tool(ToolKind::Text);
            board.pointer(
                PointerEvent::Down {
                    position: Point::new(x, y),
                    button: MouseButton::Left,
                },
                Instant::now(),
            );
            board.commit_text(&text);
        }
        Command::Undo => board.undo(),
        Command::Clear => board.clear(),
    }

    // Let outgoing frames flush before the socket closes
    app::settle(&mut board, Duration::from_millis(200));
    board.disconnect();
    Ok(())
}

fn watch(board: &mut Replica, seconds: u64) {
    let deadline = std::time::Instant::now() + Duration::from_secs(seconds);
    while std::time::Instant::now() < deadline {
        let applied = app::settle(board, Duration::from_secs(1));
        if applied > 0 {
            log::info!(
                "{} items, {} peers ({} updates)",
                board.store().len(),
                board.presence().len(),
                applied
            );
        }
    }
}

fn export(board: &Replica, output: &Path) -> Result<(), AppError> {
    let mut canvas = SvgCanvas::new();
    let frame = render_export(
        board.store(),
        SerializableColor::background().into(),
        &mut canvas,
    )?;
    std::fs::write(output, canvas.finish(frame.size))?;
    println!(
        "Exported {} items ({}x{}) to {}",
        board.store().len(),
        frame.size.width.ceil(),
        frame.size.height.ceil(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_shape() {
        let cli = Cli::try_parse_from([
            "inkboard", "--board", "team", "shape", "arrow", "0", "0", "10", "5", "--width", "4",
        ])
        .unwrap();
        assert_eq!(cli.board, "team");
        match cli.command {
            Command::Shape { kind, x2, width, .. } => {
                assert!(matches!(ToolKind::from(kind), ToolKind::Arrow));
                assert_eq!(x2, 10.0);
                assert_eq!(width, 4.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_sync_config_from_flags() {
        let cli = Cli::try_parse_from([
            "inkboard",
            "--server",
            "ws://relay:9000/ws",
            "--name",
            "Ada",
            "--reconnect-delay",
            "1",
            "undo",
        ])
        .unwrap();
        let config = cli.sync_config();
        assert_eq!(config.server_url, "ws://relay:9000/ws");
        assert_eq!(config.user_name, "Ada");
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
    }
}
