/// Terminal host for the mview model viewer
///
/// Renders the viewer as coloured ASCII art, maps keys to orbit input and
/// display parameter changes, and follows terminal resizes.
use crossterm::{
    cursor,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use log::{debug, info};
use mview_core::{
    AnimationToken, DecodingLoader, DisplayState, FileFetcher, FrameStatus, LoadState,
    LoadStatus, Parameter, Viewer, ViewerConfig, ViewerError,
};
use std::cell::RefCell;
use std::io::{self, stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub mod bindings;
pub mod cli;
pub mod renderer;
pub mod surface;

pub use bindings::Action;
pub use renderer::AsciiRenderer;
pub use surface::TerminalSurface;

use bindings::{action_for, flag_payload, next_color, stepped_payload, DOLLY_STEP, HELP_LINE};

pub type TerminalViewer = Viewer<AsciiRenderer, TerminalSurface>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Viewer(#[from] ViewerError),

    #[error(transparent)]
    Cli(#[from] cli::CliError),
}

/// Main application struct for terminal model viewing
pub struct TerminalApp {
    viewer: Rc<RefCell<TerminalViewer>>,
    token: AnimationToken,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Attaches a viewer to the current terminal and loads assets from disk.
    pub fn new(config: ViewerConfig) -> io::Result<Self> {
        let surface = TerminalSurface::from_terminal()?;
        let loader = DecodingLoader::new(FileFetcher::default());
        let viewer = Viewer::attach(config, surface, AsciiRenderer::default(), &loader);
        Ok(Self::with_viewer(viewer))
    }

    pub fn with_viewer(viewer: Rc<RefCell<TerminalViewer>>) -> Self {
        let token = viewer.borrow().animation_token();
        Self {
            viewer,
            token,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn viewer(&self) -> &Rc<RefCell<TerminalViewer>> {
        &self.viewer
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        let target_frame_time = Duration::from_millis(1000 / 30);

        while !self.token.is_cancelled() {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            if self.viewer.borrow_mut().frame()? == FrameStatus::Stopped {
                break;
            }
            self.draw()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        info!("terminal session ended");
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => {
                if let Some(action) = action_for(code) {
                    self.apply(action);
                }
            }
            Event::Resize(columns, rows) => {
                let mut viewer = self.viewer.borrow_mut();
                viewer.surface_mut().set_cells(columns, rows);
                viewer.on_resize();
            }
            _ => {}
        }
    }

    /// Parameter changes go through the viewer's string handlers, like UI events.
    pub fn apply(&mut self, action: Action) {
        let mut viewer = self.viewer.borrow_mut();

        let result = match action {
            Action::Quit => {
                viewer.destroy();
                Ok(())
            }
            Action::Orbit { left, up } => {
                let controls = viewer.controls_mut();
                controls.rotate_left(left);
                controls.rotate_up(up);
                Ok(())
            }
            Action::DollyIn => {
                viewer.controls_mut().dolly_in(DOLLY_STEP);
                Ok(())
            }
            Action::DollyOut => {
                viewer.controls_mut().dolly_out(DOLLY_STEP);
                Ok(())
            }
            Action::Step { param, steps } => {
                let current = viewer.display().get(param).as_scalar().unwrap_or_default();
                viewer.on_change(param, &stepped_payload(param, current, steps))
            }
            Action::ToggleWireframe => {
                let on = !viewer.display().wireframe;
                viewer.on_change(Parameter::Wireframe, flag_payload(on))
            }
            Action::NextColor => {
                let next = next_color(viewer.display().color);
                viewer.on_change(Parameter::Color, next)
            }
        };

        if let Err(err) = result {
            debug!("key ignored: {}", err);
        }
    }

    fn draw(&self) -> io::Result<()> {
        let viewer = self.viewer.borrow();
        let (columns, rows) = viewer.surface().cells();

        let mut stdout = stdout();
        viewer.renderer().draw(&mut stdout, (columns, rows))?;

        // Draw UI overlay
        let status = status_line(viewer.display(), viewer.load_status(), self.fps);
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(fit(&status, columns)),
            ResetColor
        )?;
        if rows > 1 {
            queue!(
                stdout,
                cursor::MoveTo(0, rows - 1),
                SetForegroundColor(Color::DarkGrey),
                Print(fit(HELP_LINE, columns)),
                ResetColor
            )?;
        }

        stdout.flush()
    }
}

fn describe(state: &LoadState) -> &'static str {
    match state {
        LoadState::Pending => "loading",
        LoadState::Loaded => "ok",
        LoadState::Failed(_) => "failed",
    }
}

/// One-line HUD with frame rate, load progress and the display settings
pub fn status_line(display: &DisplayState, status: &LoadStatus, fps: f32) -> String {
    format!(
        "mview | FPS: {:.1} | mesh: {} env: {} | fov {:.0} scale {:.2} metal {:.2} rough {:.2} blur {:.2} bg {:.1} exp {:.1} {}{}",
        fps,
        describe(&status.mesh),
        describe(&status.environment),
        display.fov,
        display.render_scale,
        display.metalness,
        display.roughness,
        display.bg_blurriness,
        display.bg_intensity,
        display.tone_mapping_exposure,
        display.color,
        if display.wireframe { " wire" } else { "" },
    )
}

fn fit(text: &str, columns: u16) -> String {
    text.chars().take(columns as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use mview_core::{AssetLoader, Color, Completion, EnvironmentMap, Mesh, Surface};

    /// Never completes; the viewer stays with no assets
    struct PendingLoader;

    impl AssetLoader for PendingLoader {
        fn load_mesh(&self, _: &str, _: Completion<Mesh>) {}

        fn load_environment(&self, _: &str, _: Completion<EnvironmentMap>) {}
    }

    fn app() -> TerminalApp {
        let viewer = Viewer::attach(
            ViewerConfig::default(),
            TerminalSurface::new(40, 12),
            AsciiRenderer::default(),
            &PendingLoader,
        );
        TerminalApp::with_viewer(viewer)
    }

    fn press(app: &mut TerminalApp, c: char) {
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
    }

    #[test]
    fn test_parameter_keys_update_display() {
        let mut app = app();
        press(&mut app, 'F');
        press(&mut app, 'm');
        press(&mut app, 'g');
        press(&mut app, 'c');

        let viewer = app.viewer().borrow();
        assert_eq!(viewer.display().fov, 50.0);
        assert!((viewer.display().metalness - 0.95).abs() < 1e-6);
        assert!(viewer.scene().material.wireframe);
        assert_eq!(viewer.scene().material.color, Color::RED);
        assert_eq!(viewer.camera().fov, 50.0);
    }

    #[test]
    fn test_steps_stop_at_range_limits() {
        let mut app = app();
        for _ in 0..5 {
            press(&mut app, 'M');
        }
        assert_eq!(app.viewer().borrow().display().metalness, 1.0);
    }

    #[test]
    fn test_dolly_moves_camera_closer() {
        let mut app = app();
        let before = {
            let viewer = app.viewer().borrow();
            (viewer.camera().position - viewer.controls().target).norm()
        };

        press(&mut app, '+');
        app.viewer().borrow_mut().frame().unwrap();

        let viewer = app.viewer().borrow();
        let after = (viewer.camera().position - viewer.controls().target).norm();
        assert!((after - before / DOLLY_STEP).abs() < 1e-4);
    }

    #[test]
    fn test_resize_event_resizes_buffer() {
        let mut app = app();
        app.handle_event(Event::Resize(100, 30));

        let viewer = app.viewer().borrow();
        assert_eq!(viewer.surface().buffer_size(), (75, 45));
        assert_eq!(viewer.renderer().software().pixels().len(), 75 * 45 * 4);
    }

    #[test]
    fn test_quit_destroys_viewer() {
        let mut app = app();
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));

        assert!(app.token.is_cancelled());
        assert_eq!(
            app.viewer().borrow_mut().frame().unwrap(),
            FrameStatus::Stopped
        );
    }

    #[test]
    fn test_status_line() {
        let status = LoadStatus {
            mesh: LoadState::Loaded,
            environment: LoadState::Failed("missing".to_owned()),
        };
        let line = status_line(&DisplayState::default(), &status, 29.5);

        assert!(line.starts_with("mview | FPS: 29.5 | mesh: ok env: failed"));
        assert!(line.contains("fov 45"));
        assert!(line.contains("#f5f6f6"));
        assert!(!line.ends_with("wire"));
        assert_eq!(fit(&line, 5), "mview");
    }
}
