use crate::config::Settings;
use crate::draw::DrawList;
use crate::input::{collect_input_nonblocking, map_event_to_action};
use crate::render::{canvas_to_cells, draw_text, term_color, CanvasRenderer, Cell, Pixel, Terminal, Viewport};
use crate::sim::{Action, Census, SimulationState};
use crossterm::style::Color;
use std::cmp::min;
use std::time::{Duration, Instant};

/// Anything beyond this many ticks of backlog in one frame is dropped.
const MAX_TICKS_PER_FRAME: u32 = 4;

const HELP_TEXT: &str = "A stellar-mass Schwarzschild hole, not to scale.\n\n\
    Disk particles orbit at Keplerian speed and recycle\n\
    once they cross the ISCO. The near side is Doppler\n\
    beamed. Stars behind the hole are lensed.\n\n\
    Arrows  pan the camera\n\
    L       toggle radius labels\n\
    H       toggle this help\n\
    Q/Esc   quit";

pub(crate) struct App {
    settings: Settings,
    sim: SimulationState,
    frame: DrawList,
    term: Terminal,
    should_quit: bool,
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        let sim = SimulationState::new(&settings);
        let term = Terminal::begin()?;
        Ok(Self {
            settings,
            sim,
            frame: DrawList::default(),
            term,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let tick_rate = self.settings.tick_rate.clamp(1, 240);
        let frame_dt = Duration::from_secs_f64(1.0 / tick_rate as f64);
        let sim_step = frame_dt;

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;

        while !self.should_quit {
            self.term.resize_if_needed()?;

            // input
            for ev in collect_input_nonblocking(frame_dt)? {
                match map_event_to_action(&ev) {
                    Some(Action::Quit) => {
                        self.should_quit = true;
                        break;
                    }
                    Some(action) => self.sim.apply(action),
                    None => {}
                }
            }

            // sim fixed-step
            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            sim_accum = sim_accum.saturating_add(real_dt);

            let mut steps = 0;
            while sim_accum >= sim_step && steps < MAX_TICKS_PER_FRAME {
                self.sim.tick();
                sim_accum = sim_accum.saturating_sub(sim_step);
                steps += 1;
            }
            if sim_accum >= sim_step {
                tracing::trace!(behind_ms = sim_accum.as_millis() as u64, "dropping sim backlog");
                sim_accum = Duration::ZERO;
            }

            self.render_frame()?;

            // frame cap
            spin_sleep(frame_dt, now);
        }
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = Color::Black;
        let color = self.settings.enable_color;
        self.term.cur.clear(bg);
        self.term.canvas.clear(Pixel::default());

        self.sim.compose(&mut self.frame);
        let vp = Viewport::fit(self.sim.world_size(), self.term.canvas.w, self.term.canvas.h);
        let mut painter = CanvasRenderer::new(&mut self.term.canvas, vp);
        self.frame.replay(&mut painter);
        let labels = std::mem::take(&mut painter.labels);

        canvas_to_cells(&self.term.canvas, &mut self.term.cur, color, bg);
        for l in &labels {
            draw_text(&mut self.term.cur, l.col, l.row, &l.text, term_color(l.color, color), bg);
        }

        let status = format!(
            " t={}  {}  |  arrows pan  l labels  h help  q quit",
            self.sim.clock.t,
            if self.sim.display.show_labels { "labels on " } else { "labels off" }
        );
        draw_text(&mut self.term.cur, 0, self.term.rows.saturating_sub(1), &status, Color::Grey, bg);

        if self.sim.display.show_help {
            self.draw_center_box("Schwarzschild black hole", HELP_TEXT);
        }

        self.term.present(true)?;
        Ok(())
    }

    fn draw_center_box(&mut self, title: &str, body: &str) {
        let w = self.term.cols;
        let h = self.term.rows;

        let bw = min(60, w.saturating_sub(4));
        let bh = min(18, h.saturating_sub(4));
        if bw < 2 || bh < 2 {
            return;
        }

        let x0 = (w - bw) / 2;
        let y0 = (h - bh) / 2;
        let buf = &mut self.term.cur;
        let mut put = |x: u16, y: u16, ch: char| {
            buf.set(
                x,
                y,
                Cell {
                    ch,
                    fg: Color::White,
                    bg: Color::Black,
                },
            );
        };

        // blank the interior so the simulation does not bleed through
        for y in y0..y0 + bh {
            for x in x0..x0 + bw {
                put(x, y, ' ');
            }
        }
        for x in x0..x0 + bw {
            put(x, y0, '─');
            put(x, y0 + bh - 1, '─');
        }
        for y in y0..y0 + bh {
            put(x0, y, '│');
            put(x0 + bw - 1, y, '│');
        }
        put(x0, y0, '┌');
        put(x0 + bw - 1, y0, '┐');
        put(x0, y0 + bh - 1, '└');
        put(x0 + bw - 1, y0 + bh - 1, '┘');

        draw_text(buf, x0 + 2, y0 + 1, title, Color::White, Color::Black);

        let mut yy = y0 + 3;
        for line in body.lines() {
            if yy >= y0 + bh - 1 {
                break;
            }
            draw_text(buf, x0 + 2, yy, line.trim_start(), Color::White, Color::Black);
            yy += 1;
        }
    }
}

pub(crate) fn run(settings: Settings) -> anyhow::Result<()> {
    let mut app = App::init(settings)?;
    let result = app.run();
    // restore the terminal even when the loop failed
    let restored = app.term.end();
    result.and(restored)
}

/// Tick and compose without a terminal.
pub(crate) fn run_headless(settings: &Settings, ticks: u64) -> Census {
    let mut sim = SimulationState::new(settings);
    let mut frame = DrawList::default();
    let mut commands = 0usize;
    for _ in 0..ticks {
        sim.tick();
        sim.compose(&mut frame);
        commands = commands.max(frame.len());
    }
    let census = sim.census();
    tracing::info!(%census, peak_draw_commands = commands, "headless run finished");
    census
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_run_reports_the_final_population() {
        let settings = Settings {
            star_count: 50,
            particle_count: 60,
            jet_count: 12,
            seed: Some(3),
            ..Settings::default()
        };
        let census = run_headless(&settings, 240);
        assert_eq!(census.t, 240);
        assert_eq!(census.particles, 60);
        assert_eq!(census.jets, 12);
        assert_eq!(census.ring_points, 200);
        assert!(census.tidal_bodies <= settings.max_tidal_bodies);
    }

    #[test]
    fn help_text_fits_the_box() {
        // 60 wide minus border and padding
        assert!(HELP_TEXT.lines().all(|l| l.trim_start().chars().count() <= 56));
        assert!(HELP_TEXT.lines().count() <= 18 - 4);
    }
}
