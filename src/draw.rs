use crate::color::Rgb;
use crate::math::Vec2;

/// Per-frame values every subsystem reads while emitting draw commands.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameContext {
    /// Screen position of the hole, camera offset included.
    pub(crate) center: Vec2,
    pub(crate) t: u64,
}

impl FrameContext {
    pub(crate) fn at(center: Vec2, t: u64) -> Self {
        Self { center, t }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum OverlayShape {
    Ring,
    Disc,
}

/// One primitive in world pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DrawCommand {
    Point {
        pos: Vec2,
        color: Rgb,
        size: f64,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgb,
        stroke: f64,
    },
    CircleOutline {
        center: Vec2,
        radius: f64,
        color: Rgb,
        stroke: f64,
    },
    FilledCircle {
        center: Vec2,
        radius: f64,
        color: Rgb,
    },
    RotatedEllipse {
        center: Vec2,
        length: f64,
        width: f64,
        angle: f64,
        color: Rgb,
    },
    Translucent {
        shape: OverlayShape,
        center: Vec2,
        radius: f64,
        color: Rgb,
        alpha: u8,
    },
    Label {
        pos: Vec2,
        text: String,
        color: Rgb,
    },
}

/// Drawing backend. The simulation never touches pixels itself.
pub(crate) trait Renderer {
    fn draw_point(&mut self, pos: Vec2, color: Rgb, size: f64);
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Rgb, stroke: f64);
    fn draw_circle_outline(&mut self, center: Vec2, radius: f64, color: Rgb, stroke: f64);
    fn draw_filled_circle(&mut self, center: Vec2, radius: f64, color: Rgb);
    fn draw_rotated_ellipse(&mut self, center: Vec2, length: f64, width: f64, angle: f64, color: Rgb);
    fn draw_translucent_overlay(&mut self, shape: OverlayShape, center: Vec2, radius: f64, color: Rgb, alpha: u8);
    fn draw_label(&mut self, pos: Vec2, text: &str, color: Rgb);
}

#[derive(Default)]
pub(crate) struct DrawList {
    cmds: Vec<DrawCommand>,
}

impl DrawList {
    pub(crate) fn push(&mut self, cmd: DrawCommand) {
        self.cmds.push(cmd);
    }

    pub(crate) fn clear(&mut self) {
        self.cmds.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.cmds.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.cmds.iter()
    }

    /// Paint in insertion order, which is the z-order.
    pub(crate) fn replay(&self, r: &mut dyn Renderer) {
        for cmd in &self.cmds {
            match cmd {
                DrawCommand::Point { pos, color, size } => r.draw_point(*pos, *color, *size),
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    stroke,
                } => r.draw_line(*from, *to, *color, *stroke),
                DrawCommand::CircleOutline {
                    center,
                    radius,
                    color,
                    stroke,
                } => r.draw_circle_outline(*center, *radius, *color, *stroke),
                DrawCommand::FilledCircle {
                    center,
                    radius,
                    color,
                } => r.draw_filled_circle(*center, *radius, *color),
                DrawCommand::RotatedEllipse {
                    center,
                    length,
                    width,
                    angle,
                    color,
                } => r.draw_rotated_ellipse(*center, *length, *width, *angle, *color),
                DrawCommand::Translucent {
                    shape,
                    center,
                    radius,
                    color,
                    alpha,
                } => r.draw_translucent_overlay(*shape, *center, *radius, *color, *alpha),
                DrawCommand::Label { pos, text, color } => r.draw_label(*pos, text, *color),
            }
        }
    }
}
