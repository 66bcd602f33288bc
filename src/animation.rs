//! Idle spin of the book.
//!
//! While nobody drags the view, the book turns by a per-frame velocity that
//! decays geometrically. Dragging hands control to the orbit controller and
//! freezes the book's own rotation until the pointer is released.

use cgmath::{Vector2, Vector3};

/// Who drives the motion this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// No drag in progress; the book spins on its own.
    Idle,
    /// A drag is in progress; the camera orbits and the book holds still.
    UserControlled,
}

impl InteractionMode {
    pub fn from_dragging(dragging: bool) -> Self {
        if dragging {
            Self::UserControlled
        } else {
            Self::Idle
        }
    }
}

/// Angular velocity of the idle spin.
#[derive(Debug, Clone, PartialEq)]
pub struct Spin {
    /// Radians per frame around the x and y axes.
    pub velocity: Vector2<f32>,
    /// Multiplier applied to `velocity` after every idle frame.
    pub decay: f32,
}

impl Spin {
    pub fn new(velocity: Vector2<f32>, decay: f32) -> Self {
        Self { velocity, decay }
    }

    /// Advance one frame.
    ///
    /// Returns whether `rotation` was changed. There is no cut-off: the
    /// velocity shrinks toward zero but only reaches it through underflow.
    pub fn tick(&mut self, rotation: &mut Vector3<f32>, mode: InteractionMode) -> bool {
        match mode {
            InteractionMode::Idle => {
                rotation.x += self.velocity.x;
                rotation.y += self.velocity.y;
                self.velocity *= self.decay;
                true
            }
            InteractionMode::UserControlled => false,
        }
    }

    /// Advance `frames` frames in the same mode.
    pub fn advance(&mut self, rotation: &mut Vector3<f32>, frames: u32, mode: InteractionMode) {
        for _ in 0..frames {
            self.tick(rotation, mode);
        }
    }
}

impl From<&crate::config::BookConfig> for Spin {
    fn from(book: &crate::config::BookConfig) -> Self {
        Self::new(book.rotation_velocity.into(), book.velocity_decay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_idle_frame_adds_velocity_then_decays() {
        let mut spin = Spin::new(Vector2::new(0.0, 0.005), 0.999);
        let mut rotation = Vector3::new(0.0, 0.0, 0.0);
        assert!(spin.tick(&mut rotation, InteractionMode::Idle));
        assert_eq!(rotation.y, 0.005);
        assert_eq!(rotation.x, 0.0);
        assert_eq!(spin.velocity.y, 0.005f32 * 0.999f32);
    }

    #[test]
    fn dragging_freezes_rotation_and_velocity() {
        let mut spin = Spin::new(Vector2::new(0.01, 0.005), 0.999);
        let mut rotation = Vector3::new(0.3, 0.5, 0.0);
        spin.advance(&mut rotation, 10_000, InteractionMode::UserControlled);
        assert_eq!(rotation, Vector3::new(0.3, 0.5, 0.0));
        assert_eq!(spin.velocity, Vector2::new(0.01, 0.005));
    }

    #[test]
    fn z_axis_is_never_touched() {
        let mut spin = Spin::new(Vector2::new(0.2, 0.2), 0.9);
        let mut rotation = Vector3::new(0.0, 0.0, 1.25);
        spin.advance(&mut rotation, 50, InteractionMode::Idle);
        assert_eq!(rotation.z, 1.25);
    }

    #[test]
    fn mode_follows_drag_signal() {
        assert_eq!(InteractionMode::from_dragging(true), InteractionMode::UserControlled);
        assert_eq!(InteractionMode::from_dragging(false), InteractionMode::Idle);
    }

    #[test]
    fn velocity_stays_positive_for_a_long_time() {
        let mut spin = Spin::new(Vector2::new(0.0, 0.005), 0.999);
        let mut rotation = Vector3::new(0.0, 0.0, 0.0);
        spin.advance(&mut rotation, 20_000, InteractionMode::Idle);
        assert!(spin.velocity.y > 0.0);
    }
}
