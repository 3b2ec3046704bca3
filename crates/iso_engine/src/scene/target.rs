//! Drawing surface abstraction
//!
//! The scene buffer only issues a handful of drawing calls, so any backend
//! can sit behind [`RenderTarget`]. [`RecordingTarget`] keeps the calls as a
//! command list, which is what headless runs and tests draw into.

use crate::foundation::math::Rect2I;

/// RGBA color
pub type Color = [u8; 4];

/// Clip region applied to subsequent draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    /// Only draw inside the rectangle
    Inside(Rect2I),
    /// Only draw outside the rectangle
    Outside(Rect2I),
}

/// Surface the scene buffer draws onto
pub trait RenderTarget {
    /// Draw the sprite `name` with its anchor at `(x, y)`
    fn draw_sprite(&mut self, name: &str, x: i32, y: i32, scale: f32);

    /// Fill `rect` with `color`
    fn fill_rect(&mut self, rect: Rect2I, color: Color);

    /// Multiply the opacity of subsequent draws by `alpha`
    fn push_alpha(&mut self, alpha: f32);

    /// Undo the last [`RenderTarget::push_alpha`]
    fn pop_alpha(&mut self);

    /// Restrict subsequent draws to `clip`
    fn push_clip(&mut self, clip: Clip);

    /// Undo the last [`RenderTarget::push_clip`]
    fn pop_clip(&mut self);
}

/// A draw call captured by [`RecordingTarget`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Sprite draw
    Sprite {
        /// Sprite name
        name: String,
        /// Screen x
        x: i32,
        /// Screen y
        y: i32,
        /// Scale the sprite was drawn at
        scale: f32,
        /// Opacity in effect
        alpha: f32,
        /// Innermost clip in effect
        clip: Option<Clip>,
    },
    /// Rectangle fill
    Rect {
        /// Filled area
        rect: Rect2I,
        /// Fill color
        color: Color,
        /// Opacity in effect
        alpha: f32,
    },
}

/// Target that records every draw call
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    commands: Vec<DrawCommand>,
    alpha: Vec<f32>,
    clips: Vec<Clip>,
}

impl RecordingTarget {
    /// Create an empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in draw order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Names of the drawn sprites in draw order
    pub fn sprite_names(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Sprite { name, .. } => Some(name.as_str()),
                DrawCommand::Rect { .. } => None,
            })
            .collect()
    }

    /// Opacity currently in effect
    pub fn current_alpha(&self) -> f32 {
        self.alpha.iter().product()
    }

    /// Whether every push has been matched by a pop
    pub fn is_balanced(&self) -> bool {
        self.alpha.is_empty() && self.clips.is_empty()
    }

    /// Drop the recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderTarget for RecordingTarget {
    fn draw_sprite(&mut self, name: &str, x: i32, y: i32, scale: f32) {
        self.commands.push(DrawCommand::Sprite {
            name: name.to_string(),
            x,
            y,
            scale,
            alpha: self.current_alpha(),
            clip: self.clips.last().copied(),
        });
    }

    fn fill_rect(&mut self, rect: Rect2I, color: Color) {
        self.commands.push(DrawCommand::Rect {
            rect,
            color,
            alpha: self.current_alpha(),
        });
    }

    fn push_alpha(&mut self, alpha: f32) {
        self.alpha.push(alpha.clamp(0.0, 1.0));
    }

    fn pop_alpha(&mut self) {
        if self.alpha.pop().is_none() {
            log::warn!("pop_alpha without a matching push_alpha");
        }
    }

    fn push_clip(&mut self, clip: Clip) {
        self.clips.push(clip);
    }

    fn pop_clip(&mut self) {
        if self.clips.pop().is_none() {
            log::warn!("pop_clip without a matching push_clip");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_stack_multiplies() {
        let mut target = RecordingTarget::new();
        target.push_alpha(0.5);
        target.push_alpha(0.5);
        target.draw_sprite("a", 0, 0, 1.0);
        target.pop_alpha();
        target.pop_alpha();
        target.draw_sprite("b", 0, 0, 1.0);

        let alphas: Vec<f32> = target
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Sprite { alpha, .. } => Some(*alpha),
                DrawCommand::Rect { .. } => None,
            })
            .collect();
        assert_eq!(alphas, vec![0.25, 1.0]);
        assert!(target.is_balanced());
    }

    #[test]
    fn test_clip_recorded_with_sprite() {
        let mut target = RecordingTarget::new();
        let clip = Clip::Outside(Rect2I::new(0, 0, 4, 4));
        target.push_clip(clip);
        target.draw_sprite("wall", 1, 2, 1.0);
        target.pop_clip();

        assert_eq!(target.sprite_names(), vec!["wall"]);
        assert!(matches!(
            target.commands()[0],
            DrawCommand::Sprite { clip: Some(c), .. } if c == clip
        ));
    }
}
