use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use orrery::body::{presets, BodyKind};
use orrery::camera::controller::{Movement, Turn};
use orrery::camera::CameraCommand;
use orrery::io::{self, LoaderConfig};
use orrery::render::hud::nearest_body;
use orrery::render::RingDefaults;
use orrery::scene::{Scene, SceneCommand};
use orrery::FrameBuffer;

const REPAINT_INTERVAL: Duration = Duration::from_millis(16);
const HELP: &str = "W/S: forward/back  A/D: strafe  Space/Ctrl: up/down  Arrows: turn  Q/E: speed -/+  \
-/=: time -/+  P: pause  L: labels  I: icons  F: focus  B: stars  O/M/K: orbits  N/U: lock/unlock  ?: nearest body info";

#[derive(Parser)]
#[command(name = "orrery-viz")]
#[command(about = "Interactive software-rendered orrery")]
struct Args {
    /// Save file to load (defaults to the built-in inner solar system)
    system: Option<PathBuf>,
    /// Binary STAR catalog for the background
    #[arg(long)]
    stars: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let system = match &args.system {
        Some(path) => io::load_system_file(path, &LoaderConfig::default())
            .with_context(|| format!("loading {}", path.display()))?,
        None => presets::inner_solar_system(&RingDefaults::default())?,
    };
    let mut scene = Scene::new(system, 1200, 760);
    if let Some(path) = &args.stars {
        let catalog = io::read_catalog_file(path).with_context(|| format!("loading {}", path.display()))?;
        scene.set_catalog(Some(catalog));
    }

    let app = OrreryViz::new(scene);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native("Orrery", options, Box::new(|_| Ok(Box::new(app))))
        .map_err(|e| anyhow!("viewer failed: {}", e))
}

struct OrreryViz {
    scene: Scene,
    fb: FrameBuffer,
    texture: Option<egui::TextureHandle>,
    last_frame: Instant,
}

impl OrreryViz {
    fn new(scene: Scene) -> Self {
        let fb = FrameBuffer::new(scene.camera.width() as usize, scene.camera.height() as usize);
        Self { scene, fb, texture: None, last_frame: Instant::now() }
    }

    /// Map raw egui input onto scene commands.
    fn handle_input(&mut self, ctx: &egui::Context) {
        let mut cmds = Vec::new();
        ctx.input(|i| {
            let held = [
                (egui::Key::W, Movement::Forward),
                (egui::Key::S, Movement::Backward),
                (egui::Key::A, Movement::Left),
                (egui::Key::D, Movement::Right),
                (egui::Key::Space, Movement::Up),
            ];
            for (key, dir) in held {
                cmds.push(SceneCommand::Camera(CameraCommand::Move(dir, i.key_down(key))));
            }
            cmds.push(SceneCommand::Camera(CameraCommand::Move(Movement::Down, i.modifiers.ctrl)));

            let turns = [
                (egui::Key::ArrowLeft, Turn::Left),
                (egui::Key::ArrowRight, Turn::Right),
                (egui::Key::ArrowUp, Turn::Up),
                (egui::Key::ArrowDown, Turn::Down),
            ];
            for (key, dir) in turns {
                cmds.push(SceneCommand::Camera(CameraCommand::Turn(dir, i.key_down(key))));
            }

            let pressed = [
                (egui::Key::Q, SceneCommand::Camera(CameraCommand::SlowDown)),
                (egui::Key::E, SceneCommand::Camera(CameraCommand::SpeedUp)),
                (egui::Key::Minus, SceneCommand::SlowerTime),
                (egui::Key::Equals, SceneCommand::FasterTime),
                (egui::Key::P, SceneCommand::TogglePause),
                (egui::Key::L, SceneCommand::ToggleLabels),
                (egui::Key::I, SceneCommand::ToggleIcons),
                (egui::Key::F, SceneCommand::ToggleFocusCulling),
                (egui::Key::B, SceneCommand::ToggleStarfield),
                (egui::Key::O, SceneCommand::ToggleOrbits(BodyKind::Planet)),
                (egui::Key::M, SceneCommand::ToggleOrbits(BodyKind::Moon)),
                (egui::Key::K, SceneCommand::ToggleOrbits(BodyKind::Asteroid)),
                (egui::Key::R, SceneCommand::ToggleRingIncidence),
                (egui::Key::Questionmark, SceneCommand::ShowNearestInfo),
                (egui::Key::U, SceneCommand::Camera(CameraCommand::Unlock)),
            ];
            for (key, cmd) in pressed {
                if i.key_pressed(key) {
                    cmds.push(cmd);
                }
            }

            if i.key_pressed(egui::Key::N) {
                let pos = self.scene.camera.position();
                if let Some(id) = nearest_body(self.scene.system(), &pos) {
                    cmds.push(SceneCommand::Camera(CameraCommand::LockTo(id)));
                }
            }
        });
        for cmd in cmds {
            self.scene.apply(cmd);
        }
    }

    fn frame_plot(&self, ui: &mut egui::Ui) {
        let points: PlotPoints = self
            .scene
            .stats
            .history()
            .enumerate()
            .map(|(i, ms)| [i as f64, ms])
            .collect();
        Plot::new("frame_times")
            .height(100.0)
            .include_y(0.0)
            .include_y(self.scene.render.frame_spike_ms)
            .show_axes([false, true])
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new("Frame (ms)", points));
            });
    }
}

impl eframe::App for OrreryViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        egui::TopBottomPanel::bottom("stats").show(ctx, |ui| {
            ui.label(format!(
                "Frame {:.2} ms  |  mean {:.2} ms  |  spikes {}  |  focus {}",
                self.scene.stats.last_ms(),
                self.scene.stats.mean_ms(),
                self.scene.stats.spikes(),
                self.scene
                    .overlay
                    .focus()
                    .map_or("none", |id| self.scene.system()[id].name.as_str()),
            ));
            self.frame_plot(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let size = ui.available_size();
                let (w, h) = (size.x.max(1.0) as usize, size.y.max(1.0) as usize);
                if w != self.fb.width() || h != self.fb.height() {
                    self.fb.resize(w, h);
                }

                let now = Instant::now();
                let dt = now - self.last_frame;
                self.last_frame = now;
                self.scene.render_frame(dt, &mut self.fb);

                let image = egui::ColorImage::from_rgba_unmultiplied([w, h], &self.fb.to_rgba_bytes());
                let texture_id = match &mut self.texture {
                    Some(t) => {
                        t.set(image, egui::TextureOptions::NEAREST);
                        t.id()
                    }
                    None => {
                        let t = ctx.load_texture("frame", image, egui::TextureOptions::NEAREST);
                        let id = t.id();
                        self.texture = Some(t);
                        id
                    }
                };

                let response = ui.add(
                    egui::Image::new((texture_id, egui::vec2(w as f32, h as f32))).sense(egui::Sense::drag()),
                );
                if response.drag_started() {
                    self.scene.apply(SceneCommand::Camera(CameraCommand::DragStart));
                }
                if response.dragged() {
                    let d = response.drag_delta();
                    self.scene
                        .apply(SceneCommand::Camera(CameraCommand::DragBy { dx: d.x as f64, dy: d.y as f64 }));
                }
                if response.drag_stopped() {
                    self.scene.apply(SceneCommand::Camera(CameraCommand::DragEnd));
                }

                let origin = response.rect.min;
                let painter = ui.painter_at(response.rect);
                let font = egui::FontId::proportional(12.0);
                for label in &self.fb.labels {
                    let a = (label.alpha.clamp(0.0, 1.0) * 255.0) as u8;
                    painter.text(
                        origin + egui::vec2(label.x as f32, label.y as f32),
                        egui::Align2::CENTER_BOTTOM,
                        &label.text,
                        font.clone(),
                        egui::Color32::from_rgba_unmultiplied(255, 255, 255, a),
                    );
                }

                let mut y = 10.0;
                for line in self.fb.hud.iter().map(String::as_str).chain([HELP]) {
                    painter.text(
                        origin + egui::vec2(10.0, y),
                        egui::Align2::LEFT_TOP,
                        line,
                        font.clone(),
                        egui::Color32::WHITE,
                    );
                    y += 15.0;
                }
            });

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
