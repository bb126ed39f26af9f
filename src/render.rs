use crate::color::Rgb;
use crate::draw::{OverlayShape, Renderer};
use crate::math::Vec2;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell {
            bg,
            ..Cell::default()
        });
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl Pixel {
    fn from_rgb(c: Rgb, a: u8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a,
        }
    }
}

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn clear(&mut self, p: Pixel) {
        self.px.fill(p);
    }
    fn blend_over(&mut self, x: i32, y: i32, src: Pixel) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];

        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let prev = CellBuffer::new(cols, rows);
        let cur = CellBuffer::new(cols, rows);

        // Braille: 2×4 pixels per cell
        let canvas = PixelCanvas::new(cols as u32 * 2, rows as u32 * 4);

        Ok(Self {
            out,
            cols,
            rows,
            prev,
            cur,
            canvas,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        tracing::debug!(cols = c, rows = r, "terminal resized");
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.canvas = PixelCanvas::new(c as u32 * 2, r as u32 * 4);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

/// Pixels this dark stay un-inked, so the horizon reads as empty space.
const INK_FLOOR: u8 = 24;

fn is_ink(p: Pixel) -> bool {
    p.a >= 32 && p.r.max(p.g).max(p.b) >= INK_FLOOR
}

pub(crate) fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer, enable_color: bool, bg: Color) {
    let cols = out.w as u32;
    let rows = out.h as u32;

    for cy in 0..rows {
        for cx in 0..cols {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut mask: u8 = 0;
            let mut sum_r: u32 = 0;
            let mut sum_g: u32 = 0;
            let mut sum_b: u32 = 0;
            let mut ink_count: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let x = px0 + dx;
                    let y = py0 + dy;
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let p = canvas.px[canvas.idx(x, y)];
                    if is_ink(p) {
                        mask |= braille_bit(dx, dy);
                        sum_r += p.r as u32;
                        sum_g += p.g as u32;
                        sum_b += p.b as u32;
                        ink_count += 1;
                    }
                }
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');

            let fg = if enable_color && ink_count > 0 {
                Color::Rgb {
                    r: (sum_r / ink_count) as u8,
                    g: (sum_g / ink_count) as u8,
                    b: (sum_b / ink_count) as u8,
                }
            } else {
                Color::White
            };

            out.set(cx as u16, cy as u16, Cell { ch, fg, bg });
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

pub(crate) fn term_color(c: Rgb, enable_color: bool) -> Color {
    if enable_color {
        Color::Rgb { r: c.r, g: c.g, b: c.b }
    } else {
        Color::White
    }
}

/* -----------------------------
   World -> canvas mapping
------------------------------ */

/// Uniform scale that fits the world into the canvas, letterboxed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    pub(crate) scale: f64,
    pub(crate) origin: Vec2,
}

impl Viewport {
    pub(crate) fn fit(world: Vec2, canvas_w: u32, canvas_h: u32) -> Self {
        let (cw, ch) = (canvas_w as f64, canvas_h as f64);
        let scale = (cw / world.x.max(1.0)).min(ch / world.y.max(1.0));
        Self {
            scale,
            origin: Vec2::new((cw - world.x * scale) * 0.5, (ch - world.y * scale) * 0.5),
        }
    }

    pub(crate) fn to_canvas(&self, p: Vec2) -> Vec2 {
        Vec2::new(self.origin.x + p.x * self.scale, self.origin.y + p.y * self.scale)
    }

    fn len(&self, world_len: f64) -> f64 {
        world_len * self.scale
    }
}

pub(crate) struct TextLabel {
    pub(crate) col: u16,
    pub(crate) row: u16,
    pub(crate) text: String,
    pub(crate) color: Rgb,
}

/// Paints draw commands onto the braille canvas. Labels are collected and
/// stamped onto the cell grid afterwards, since text cannot live in subpixels.
pub(crate) struct CanvasRenderer<'a> {
    canvas: &'a mut PixelCanvas,
    vp: Viewport,
    pub(crate) labels: Vec<TextLabel>,
}

impl<'a> CanvasRenderer<'a> {
    pub(crate) fn new(canvas: &'a mut PixelCanvas, vp: Viewport) -> Self {
        Self {
            canvas,
            vp,
            labels: Vec::new(),
        }
    }

    fn plot(&mut self, x: f64, y: f64, px: Pixel) {
        self.canvas.blend_over(x.floor() as i32, y.floor() as i32, px);
    }

    fn fill_disc(&mut self, c: Vec2, r: f64, px: Pixel) {
        if r < 0.75 {
            self.plot(c.x, c.y, px);
            return;
        }
        let (x0, x1) = ((c.x - r).floor() as i32, (c.x + r).ceil() as i32);
        let (y0, y1) = ((c.y - r).floor() as i32, (c.y + r).ceil() as i32);
        let r2 = r * r;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - c.x;
                let dy = y as f64 + 0.5 - c.y;
                if dx * dx + dy * dy <= r2 {
                    self.canvas.blend_over(x, y, px);
                }
            }
        }
    }

    fn ring(&mut self, c: Vec2, r: f64, px: Pixel) {
        if r < 0.75 {
            self.plot(c.x, c.y, px);
            return;
        }
        // one sample per canvas pixel of circumference
        let steps = (std::f64::consts::TAU * r).ceil().max(8.0) as usize;
        let mut last = None;
        for i in 0..steps {
            let p = c.add(Vec2::polar(i as f64 / steps as f64 * std::f64::consts::TAU, r));
            let cell = (p.x.floor() as i32, p.y.floor() as i32);
            // avoid double-blending translucent rings
            if last != Some(cell) {
                self.canvas.blend_over(cell.0, cell.1, px);
                last = Some(cell);
            }
        }
    }
}

impl Renderer for CanvasRenderer<'_> {
    fn draw_point(&mut self, pos: Vec2, color: Rgb, size: f64) {
        let c = self.vp.to_canvas(pos);
        let r = self.vp.len(size * 0.5);
        self.fill_disc(c, r, Pixel::from_rgb(color, 255));
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Rgb, stroke: f64) {
        let a = self.vp.to_canvas(from);
        let b = self.vp.to_canvas(to);
        let d = b.sub(a);
        let steps = d.x.abs().max(d.y.abs()).ceil().max(1.0) as usize;
        let px = Pixel::from_rgb(color, 255);
        // thin strokes collapse to single pixels inside fill_disc
        let half = self.vp.len(stroke * 0.5);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.fill_disc(Vec2::new(a.x + d.x * t, a.y + d.y * t), half, px);
        }
    }

    fn draw_circle_outline(&mut self, center: Vec2, radius: f64, color: Rgb, stroke: f64) {
        let c = self.vp.to_canvas(center);
        let r = self.vp.len(radius);
        let w = self.vp.len(stroke);
        let px = Pixel::from_rgb(color, 255);
        if w <= 1.0 {
            self.ring(c, r, px);
            return;
        }
        // concentric one-pixel rings spanning the stroke
        let inner = r - w * 0.5;
        for i in 0..w.ceil() as usize {
            let rr = inner + i as f64 + 0.5;
            if rr > 0.0 {
                self.ring(c, rr, px);
            }
        }
    }

    fn draw_filled_circle(&mut self, center: Vec2, radius: f64, color: Rgb) {
        let c = self.vp.to_canvas(center);
        let r = self.vp.len(radius);
        self.fill_disc(c, r, Pixel::from_rgb(color, 255));
    }

    fn draw_rotated_ellipse(&mut self, center: Vec2, length: f64, width: f64, angle: f64, color: Rgb) {
        let c = self.vp.to_canvas(center);
        let a = self.vp.len(length * 0.5).max(0.5);
        let b = self.vp.len(width * 0.5).max(0.5);
        let px = Pixel::from_rgb(color, 255);
        if a < 0.75 {
            self.plot(c.x, c.y, px);
            return;
        }
        let (sin, cos) = angle.sin_cos();
        let (x0, x1) = ((c.x - a).floor() as i32, (c.x + a).ceil() as i32);
        let (y0, y1) = ((c.y - a).floor() as i32, (c.y + a).ceil() as i32);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - c.x;
                let dy = y as f64 + 0.5 - c.y;
                // into the ellipse frame, long axis along `angle`
                let u = dx * cos + dy * sin;
                let v = -dx * sin + dy * cos;
                if (u / a).powi(2) + (v / b).powi(2) <= 1.0 {
                    self.canvas.blend_over(x, y, px);
                }
            }
        }
    }

    fn draw_translucent_overlay(&mut self, shape: OverlayShape, center: Vec2, radius: f64, color: Rgb, alpha: u8) {
        let c = self.vp.to_canvas(center);
        let r = self.vp.len(radius);
        let px = Pixel::from_rgb(color, alpha);
        match shape {
            OverlayShape::Ring => self.ring(c, r, px),
            OverlayShape::Disc => self.fill_disc(c, r, px),
        }
    }

    fn draw_label(&mut self, pos: Vec2, text: &str, color: Rgb) {
        let p = self.vp.to_canvas(pos);
        if p.x < 0.0 || p.y < 0.0 {
            return;
        }
        self.labels.push(TextLabel {
            col: (p.x / 2.0) as u16,
            row: (p.y / 4.0) as u16,
            text: text.to_string(),
            color,
        });
    }
}
