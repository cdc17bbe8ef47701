//! Rendering contract between the simulation and whatever draws it.
//!
//! Entities only describe what they look like through [`Canvas`]; the surface behind it
//! (browser canvas, GPU, terminal, or nothing at all) lives outside this crate.

use robaczki_core::{Color, Position};

/// Drawing primitives consumed by every `draw` entry point
pub trait Canvas {
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// Clear the whole surface
    fn background(&mut self, color: Color);
    /// Color used by subsequent filled shapes
    fn fill(&mut self, color: Color);

    fn ellipse(&mut self, center: Position, width: f64, height: f64);
    fn triangle(&mut self, a: Position, b: Position, c: Position);
    fn polygon(&mut self, points: &[Position]);
    /// Axis-aligned rectangle centered on `center` with rounded corners
    fn rounded_rect(&mut self, center: Position, width: f64, height: f64, radius: f64);

    /// Save the current transform and fill
    fn push(&mut self);
    /// Restore the state saved by the matching `push`
    fn pop(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, angle: f64);
}

/// Run `f` inside a push/pop pair so any transform it applies is undone afterwards.
pub fn scoped<C, F>(canvas: &mut C, f: F)
where
    C: Canvas + ?Sized,
    F: FnOnce(&mut C),
{
    canvas.push();
    f(canvas);
    canvas.pop();
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Color),
    Fill(Color),
    Ellipse {
        center: Position,
        width: f64,
        height: f64,
    },
    Triangle([Position; 3]),
    Polygon(Vec<Position>),
    RoundedRect {
        center: Position,
        width: f64,
        height: f64,
        radius: f64,
    },
    Push,
    Pop,
    Translate {
        dx: f64,
        dy: f64,
    },
    Rotate(f64),
}

impl DrawCommand {
    /// True for commands that put pixels on the surface
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            DrawCommand::Background(_)
                | DrawCommand::Ellipse { .. }
                | DrawCommand::Triangle(_)
                | DrawCommand::Polygon(_)
                | DrawCommand::RoundedRect { .. }
        )
    }
}

/// Canvas that keeps every command, for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
    depth: usize,
    max_depth: usize,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn shape_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_shape()).count()
    }

    /// Current push depth; zero once every scope is closed
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Drop the recorded commands, ready for the next frame
    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
        self.max_depth = 0;
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn background(&mut self, color: Color) {
        self.commands.push(DrawCommand::Background(color));
    }

    fn fill(&mut self, color: Color) {
        self.commands.push(DrawCommand::Fill(color));
    }

    fn ellipse(&mut self, center: Position, width: f64, height: f64) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            width,
            height,
        });
    }

    fn triangle(&mut self, a: Position, b: Position, c: Position) {
        self.commands.push(DrawCommand::Triangle([a, b, c]));
    }

    fn polygon(&mut self, points: &[Position]) {
        self.commands.push(DrawCommand::Polygon(points.to_vec()));
    }

    fn rounded_rect(&mut self, center: Position, width: f64, height: f64, radius: f64) {
        self.commands.push(DrawCommand::RoundedRect {
            center,
            width,
            height,
            radius,
        });
    }

    fn push(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.commands.push(DrawCommand::Push);
    }

    fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.commands.push(DrawCommand::Pop);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.commands.push(DrawCommand::Translate { dx, dy });
    }

    fn rotate(&mut self, angle: f64) {
        self.commands.push(DrawCommand::Rotate(angle));
    }
}

/// Canvas that discards everything
#[derive(Debug, Clone, Copy)]
pub struct NullCanvas {
    pub width: f64,
    pub height: f64,
}

impl NullCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Canvas for NullCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn background(&mut self, _color: Color) {}
    fn fill(&mut self, _color: Color) {}
    fn ellipse(&mut self, _center: Position, _width: f64, _height: f64) {}
    fn triangle(&mut self, _a: Position, _b: Position, _c: Position) {}
    fn polygon(&mut self, _points: &[Position]) {}
    fn rounded_rect(&mut self, _center: Position, _width: f64, _height: f64, _radius: f64) {}
    fn push(&mut self) {}
    fn pop(&mut self) {}
    fn translate(&mut self, _dx: f64, _dy: f64) {}
    fn rotate(&mut self, _angle: f64) {}
}
