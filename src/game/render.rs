//! Render model: what must be drawn and erased, not how pixels get written

use bitvec::prelude::*;
use tracing::trace;

use crate::game::constants::arena::{HEIGHT, WIDTH};
use crate::util::ivec2::IVec2;

/// Inclusive pixel rectangle, `(x0, y0)..=(x1, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    /// Box covering `origin..=origin + (width, height)`, the way the display fills entities
    pub fn sized(origin: IVec2, width: i32, height: i32) -> Self {
        Self {
            x0: origin.x,
            y0: origin.y,
            x1: origin.x + width,
            y1: origin.y + height,
        }
    }

    pub fn square(origin: IVec2, size: i32) -> Self {
        Self::sized(origin, size, size)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// One drawing instruction for the display collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    /// Blank the whole screen
    ClearScreen,
    /// Paint a rectangle in the foreground color
    Fill(Rect),
    /// Paint a rectangle in the background color
    Clear(Rect),
}

/// Consumer of render commands
pub trait Renderer {
    fn apply(&mut self, command: &RenderCommand);
}

/// Records commands in order
impl Renderer for Vec<RenderCommand> {
    fn apply(&mut self, command: &RenderCommand) {
        self.push(*command);
    }
}

/// Logs every command at trace level
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn apply(&mut self, command: &RenderCommand) {
        trace!(?command, "render");
    }
}

/// Every on-screen pixel
const SCREEN: Rect = Rect {
    x0: 0,
    y0: 0,
    x1: WIDTH - 1,
    y1: HEIGHT - 1,
};

/// Monochrome framebuffer the size of the arena
pub struct Canvas {
    pixels: BitVec,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            pixels: bitvec![0; (WIDTH * HEIGHT) as usize],
        }
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        if !SCREEN.contains(x, y) {
            return false;
        }
        self.pixels[(y * WIDTH + x) as usize]
    }

    pub fn count_set(&self) -> usize {
        self.pixels.count_ones()
    }

    /// Whether every on-screen pixel of `rect` is lit
    pub fn is_filled(&self, rect: &Rect) -> bool {
        let x0 = rect.x0.max(0);
        let x1 = rect.x1.min(WIDTH - 1);
        let y0 = rect.y0.max(0);
        let y1 = rect.y1.min(HEIGHT - 1);
        (y0..=y1).all(|y| (x0..=x1).all(|x| self.is_set(x, y)))
    }

    fn paint(&mut self, rect: &Rect, value: bool) {
        let x0 = rect.x0.max(0);
        let x1 = rect.x1.min(WIDTH - 1);
        let y0 = rect.y0.max(0);
        let y1 = rect.y1.min(HEIGHT - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        for y in y0..=y1 {
            let row = (y * WIDTH) as usize;
            self.pixels[row + x0 as usize..=row + x1 as usize].fill(value);
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Canvas {
    fn apply(&mut self, command: &RenderCommand) {
        match command {
            RenderCommand::ClearScreen => self.pixels.fill(false),
            RenderCommand::Fill(rect) => self.paint(rect, true),
            RenderCommand::Clear(rect) => self.paint(rect, false),
        }
    }
}
