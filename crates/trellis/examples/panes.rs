//! Split-pane demo.
//!
//! A header, two focusable panes side by side, and an animated status line.
//! Tab and Shift+Tab move focus, `q` or Ctrl+C quits. Set `TRELLIS_LOG` to
//! an env-filter directive (for example `trellis=debug`) to write logs to
//! `trellis.log`.
//!
//! Run with: cargo run -p trellis --example panes

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;
use trellis::prelude::*;

/// Fill `area` with `first_line` followed by blank rows.
fn draw(area: Rect, first_line: &str) {
    if area.is_empty() {
        return;
    }
    let width = usize::from(area.width);
    let mut out = io::stdout();
    for row in 0..area.height {
        let text = if row == 0 { first_line } else { "" };
        let line: String = format!("{text:<width$}").chars().take(width).collect();
        let _ = queue!(out, MoveTo(area.x, area.y + row), Print(line));
    }
    let _ = out.flush();
}

struct Pane {
    title: &'static str,
}

impl WidgetBehavior for Pane {
    fn event(&mut self, cx: &mut EventContext<'_>, event: &Event) -> bool {
        match event.kind() {
            EventKind::Paint | EventKind::FocusIn { .. } | EventKind::FocusOut { .. } => {
                let area = cx.geometry();
                let marker = if cx.is_focused() { '>' } else { ' ' };
                draw(area, &format!("{marker} {} ({}x{})", self.title, area.width, area.height));
                true
            }
            EventKind::Input(InputEvent::Key(key)) if key.code == KeyCode::Char('q') => {
                cx.quit();
                true
            }
            _ => false,
        }
    }
}

struct Header;

impl WidgetBehavior for Header {
    fn paint(&mut self, cx: &mut EventContext<'_>) {
        draw(cx.geometry(), "trellis demo: Tab to move focus, q to quit");
    }
}

struct Spinner {
    frame: usize,
    started: bool,
}

impl Spinner {
    const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
}

impl WidgetBehavior for Spinner {
    fn on_timer(&mut self, cx: &mut EventContext<'_>, _tick: u64) {
        self.frame = (self.frame + 1) % Self::FRAMES.len();
        self.paint(cx);
    }

    fn paint(&mut self, cx: &mut EventContext<'_>) {
        if !self.started {
            self.started = true;
            cx.start_animation(Duration::from_millis(120));
        }
        draw(cx.geometry(), &format!("{} running", Self::FRAMES[self.frame]));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(filter) = std::env::var("TRELLIS_LOG") {
        let file = std::fs::File::create("trellis.log")?;
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let config = SystemConfig::default();
    let mut system = System::with_config(CrosstermTerminal::with_config(&config), config);

    let root = system.add_widget(WidgetNode::container("root", Orientation::Vertical));
    system.add_child(
        root,
        WidgetNode::new("header")
            .with_vertical(SizePolicy::fixed(1))
            .with_behavior(Header),
    )?;
    let body = system.add_child(
        root,
        WidgetNode::container("body", Orientation::Horizontal).with_vertical(SizePolicy::expanding(0)),
    )?;
    let left = system.add_child(
        body,
        WidgetNode::new("left")
            .with_horizontal(SizePolicy::expanding(0))
            .with_focusable(true)
            .with_behavior(Pane { title: "left" }),
    )?;
    system.add_child(
        body,
        WidgetNode::new("right")
            .with_horizontal(SizePolicy::expanding(0).with_stretch(2))
            .with_focusable(true)
            .with_behavior(Pane { title: "right" }),
    )?;
    system.add_child(
        root,
        WidgetNode::new("status")
            .with_vertical(SizePolicy::fixed(1))
            .with_behavior(Spinner {
                frame: 0,
                started: false,
            }),
    )?;

    system.set_initial_focus(left);
    system.set_head(Some(root))?;
    let code = system.run()?;
    std::process::exit(code);
}
