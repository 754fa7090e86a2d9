//! Example game demonstrating the engine core

use ember2d::prelude::*;

/// A bouncing square, in logical pixels.
struct Bouncer {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    size: i32,
    color: Color,
}

/// Demo game: squares bouncing around the fixed logical resolution,
/// letterboxed into whatever window shape the platform gives us.
struct DemoGame {
    bouncers: Vec<Bouncer>,
    elapsed: f32,
}

impl DemoGame {
    fn new() -> Self {
        Self {
            bouncers: Vec::new(),
            elapsed: 0.0,
        }
    }
}

impl Game for DemoGame {
    fn init(&mut self, ctx: &mut EngineContext) {
        log::info!("Initializing demo game");

        let (width, height) = ctx.compositor.logical_size();
        let palette = [
            Color::rgb(220, 80, 80),
            Color::rgb(80, 200, 120),
            Color::rgb(90, 120, 230),
            Color::rgb(230, 200, 90),
        ];
        for (index, color) in palette.into_iter().enumerate() {
            let size = 10 + index as i32 * 4;
            self.bouncers.push(Bouncer {
                x: (width as f32 / 5.0) * (index + 1) as f32,
                y: height as f32 / 2.0,
                dx: 40.0 + index as f32 * 25.0,
                dy: 30.0 + index as f32 * 20.0,
                size,
                color,
            });
        }
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        let dt = ctx.time.delta_seconds();
        self.elapsed += dt;

        let (width, height) = ctx.compositor.logical_size();
        for bouncer in &mut self.bouncers {
            bouncer.x += bouncer.dx * dt;
            bouncer.y += bouncer.dy * dt;
            let max_x = (width as i32 - bouncer.size) as f32;
            let max_y = (height as i32 - bouncer.size) as f32;
            if bouncer.x < 0.0 || bouncer.x > max_x {
                bouncer.dx = -bouncer.dx;
                bouncer.x = bouncer.x.clamp(0.0, max_x);
            }
            if bouncer.y < 0.0 || bouncer.y > max_y {
                bouncer.dy = -bouncer.dy;
                bouncer.y = bouncer.y.clamp(0.0, max_y);
            }
        }

        // Cycle the display scale every few seconds to show the
        // letterboxed window resizing around the same logical frame.
        let scale = 2 + (self.elapsed / 5.0) as u32 % 3;
        ctx.set_scale(scale);

        if self.elapsed > 60.0 {
            ctx.quit();
        }
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        ctx.clear();

        let (width, height) = ctx.compositor.logical_size();
        ctx.draw_rect(
            Rect::new(2, 2, width as i32 - 4, height as i32 - 4),
            Color::rgb(60, 60, 70),
        );

        for bouncer in &self.bouncers {
            ctx.fill_rect(
                Rect::new(
                    bouncer.x as i32,
                    bouncer.y as i32,
                    bouncer.size,
                    bouncer.size,
                ),
                bouncer.color,
            );
        }

        ctx.present_scaled();
        ctx.flip();
    }

    fn shutdown(&mut self, ctx: &mut EngineContext) {
        log::info!(
            "Demo ran {} frames at {:.1} fps average",
            ctx.stats.total_frames(),
            ctx.stats.fps()
        );
    }
}

fn main() {
    let config = EngineConfig::default()
        .with_title("ember2d demo")
        .with_logical_size(320, 180)
        .with_scale(3)
        .with_clear_color(Color::rgb(24, 24, 32));

    let engine = Engine::new(config, DemoGame::new());
    if let Err(err) = engine.run() {
        eprintln!("Engine error: {err}");
        std::process::exit(1);
    }
}
