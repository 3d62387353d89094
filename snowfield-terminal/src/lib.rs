/// Terminal render driver for the snowfield scene
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self},
};
use snowfield_core::{transform::mvp_matrix, Action, Projection, Scene};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

pub mod config;
pub mod error;
pub mod renderer;
pub mod texture;

pub use config::{Cli, ScreenshotConfig, ViewerConfig};
pub use error::{Result, ViewerError};
pub use renderer::{Framebuffer, Rasterizer, RenderContext, TextureHandle};
pub use texture::Texture;

/// What a key press asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Camera(Action),
    Quit,
}

/// Map a key to a viewer command
pub fn command_for_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('w') | KeyCode::Up => Some(Command::Camera(Action::MoveForward)),
        KeyCode::Char('s') | KeyCode::Down => Some(Command::Camera(Action::MoveBackward)),
        KeyCode::Char('a') | KeyCode::Left => Some(Command::Camera(Action::RotateLeft)),
        KeyCode::Char('d') | KeyCode::Right => Some(Command::Camera(Action::RotateRight)),
        _ => None,
    }
}

/// Scene, textures and the frame they are drawn into
pub struct SceneRenderer {
    context: RenderContext,
    ground_texture: TextureHandle,
    cube_texture: TextureHandle,
    projection: Projection,
    framebuffer: Framebuffer,
}

impl SceneRenderer {
    /// Upload the ground and cube textures and size the frame
    pub fn new(config: &ViewerConfig, width: usize, height: usize) -> Result<Self> {
        let ground = match &config.ground_texture {
            Some(path) => Texture::load(path)?,
            None => Texture::snow(),
        };
        let cube = match &config.cube_texture {
            Some(path) => Texture::load(path)?,
            None => Texture::tree(),
        };

        let mut context = RenderContext::new();
        let ground_texture = context.upload(ground);
        let cube_texture = context.upload(cube);

        Ok(Self {
            context,
            ground_texture,
            cube_texture,
            projection: Projection::new(width as u32, height as u32),
            framebuffer: Framebuffer::new(width, height),
        })
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        debug!(width, height, "viewport resized");
        self.projection.resize(width as u32, height as u32);
        self.framebuffer = Framebuffer::new(width, height);
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Draw the ground, then the spinning cube
    pub fn render(&mut self, scene: &Scene) -> usize {
        self.framebuffer.clear(self.context.clear_color);

        let view = scene.view_matrix();
        let projection = self.projection.matrix();

        self.context.bind(self.ground_texture);
        let ground_mvp = mvp_matrix(&scene.ground_model_matrix(), &view, &projection);
        let mut drawn =
            Rasterizer::draw_mesh(&mut self.framebuffer, &self.context, scene.ground(), &ground_mvp);

        self.context.bind(self.cube_texture);
        let cube_mvp = mvp_matrix(&scene.cube_model_matrix(), &view, &projection);
        drawn += Rasterizer::draw_mesh(&mut self.framebuffer, &self.context, scene.cube(), &cube_mvp);

        trace!(drawn, "frame rendered");
        drawn
    }
}

/// Render one frame of a fresh scene into a PNG
pub fn screenshot(config: &ViewerConfig, output: &ScreenshotConfig) -> Result<()> {
    let scene = Scene::new(&config.grid, config.steps);
    let mut renderer =
        SceneRenderer::new(config, output.width as usize, output.height as usize)?;
    let drawn = renderer.render(&scene);

    renderer
        .framebuffer()
        .to_image()
        .save(&output.path)
        .map_err(ViewerError::Screenshot)?;
    info!(path = %output.path.display(), drawn, "screenshot written");
    Ok(())
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    scene: Scene,
    renderer: SceneRenderer,
    tick_interval: Duration,
    running: bool,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        let (columns, rows) = terminal::size()?;
        let (width, height) = renderer::terminal_pixels(columns, rows);

        Ok(Self {
            scene: Scene::new(&config.grid, config.steps),
            renderer: SceneRenderer::new(config, width, height)?,
            tick_interval: config.tick_interval,
            running: true,
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        info!(tick = ?self.tick_interval, "viewer started");

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;
        info!("viewer stopped");

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let mut next_tick = Instant::now() + self.tick_interval;

        while self.running {
            // Wait for input until the next tick is due
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                self.handle_event(event::read()?);
                // Drain whatever else queued up
                while self.running && event::poll(Duration::ZERO)? {
                    self.handle_event(event::read()?);
                }
            }

            if Instant::now() >= next_tick {
                self.scene.tick();
                next_tick += self.tick_interval;
                // Do not try to catch up after a slow frame
                if next_tick < Instant::now() {
                    next_tick = Instant::now() + self.tick_interval;
                }
            }

            if self.running && self.scene.take_redraw() {
                self.render()?;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => match command_for_key(code) {
                Some(Command::Quit) => self.running = false,
                Some(Command::Camera(action)) => self.scene.apply(action),
                None => {}
            },
            Event::Resize(columns, rows) => {
                let (width, height) = renderer::terminal_pixels(columns, rows);
                self.renderer.resize(width, height);
                self.scene.request_redraw();
            }
            _ => {}
        }
    }

    fn render(&mut self) -> Result<()> {
        self.renderer.render(&self.scene);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.framebuffer().draw(&mut stdout)?;

        // Status line
        let location = self.scene.camera.location;
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetBackgroundColor(Color::Black),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Snowfield | FPS: {:.1} | Camera: ({:.2}, {:.2}, {:.2}) | Arrows/WASD=Move Q=Quit",
                self.fps, location.x, location.y, location.z
            )),
            ResetColor
        )?;
        stdout.flush()?;

        self.update_fps();
        Ok(())
    }

    fn update_fps(&mut self) {
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now - self.last_fps_sample;
        if elapsed.as_secs() >= 1 {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            trace!(fps = self.fps, "frame rate");
            self.frame_count = 0;
            self.last_fps_sample = now;
        }
    }
}
