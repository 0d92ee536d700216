// Renderer that paints particle field frames and cursor trails onto a 2d canvas.
// Holds the context plus the styling that does not change from frame to frame.

use crate::color::Color;
use crate::dom;
use crate::error::{FieldError, Result};
use crate::field::Frame;
use crate::trail::TrailSprite;
use std::f64::consts::PI;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct Canvas2dRenderer {
    pub context: CanvasRenderingContext2d,
    pub width: f64,
    pub height: f64,
    pub connection_style: String,
    pub connection_width: f64,
    pub trail_style: String,
    pub trail_radius: f64,
}

impl Canvas2dRenderer {
    pub fn new(canvas: &HtmlCanvasElement, connection_color: Color) -> Result<Self> {
        let context = dom::context_2d(canvas)?;
        Ok(Canvas2dRenderer {
            context,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
            connection_style: connection_color.to_css(),
            connection_width: 1.0,
            trail_style: Color::rgba(155, 17, 30, 255).to_css(),
            trail_radius: 6.0,
        })
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn clear_screen(&self) {
        self.context.set_global_alpha(1.0);
        self.context.clear_rect(0.0, 0.0, self.width, self.height);
    }

    pub fn render_frame(&self, frame: &Frame) -> Result<()> {
        self.clear_screen();

        // Connection lines first so particles sit on top of them
        self.context.set_stroke_style_str(&self.connection_style);
        self.context.set_line_width(self.connection_width);
        for connection in &frame.connections {
            self.context.set_global_alpha(connection.opacity);
            self.context.begin_path();
            self.context.move_to(connection.from[0], connection.from[1]);
            self.context.line_to(connection.to[0], connection.to[1]);
            self.context.stroke();
        }

        for sprite in &frame.sprites {
            if sprite.opacity <= 0.0 {
                continue;
            }
            self.context.set_global_alpha(sprite.opacity);
            self.context.set_fill_style_str(&sprite.color.to_css());
            self.fill_circle(sprite.pos, sprite.radius)?;
        }

        self.context.set_global_alpha(1.0);
        Ok(())
    }

    // Trail sprites are drawn over whatever is already on the canvas
    pub fn render_trail(&self, sprites: &[TrailSprite]) -> Result<()> {
        self.context.set_fill_style_str(&self.trail_style);
        for sprite in sprites {
            self.context.set_global_alpha(sprite.opacity);
            self.fill_circle(sprite.pos, self.trail_radius * sprite.scale)?;
        }
        self.context.set_global_alpha(1.0);
        Ok(())
    }

    fn fill_circle(&self, pos: [f64; 2], radius: f64) -> Result<()> {
        self.context.begin_path();
        self.context
            .arc(pos[0], pos[1], radius.max(0.0), 0.0, 2.0 * PI)
            .map_err(|e| FieldError::from_js("arc", e))?;
        self.context.fill();
        Ok(())
    }
}
