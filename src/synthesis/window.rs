// Copyright (c) 2024 Mike Tsao

use core::f64::consts::PI;

/// A raised-cosine fade-in at the start of a buffer and a mirrored fade-out
/// at its end. The fade never covers more than half the buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeWindow {
    frame_count: usize,
    fade_len: usize,
}
impl FadeWindow {
    #[allow(missing_docs)]
    pub fn new_with(frame_count: usize, fade_frames: usize) -> Self {
        Self {
            frame_count,
            fade_len: fade_frames.min(frame_count / 2),
        }
    }

    /// Frames in each fade after limiting to half the buffer.
    pub fn fade_len(&self) -> usize {
        self.fade_len
    }

    /// The envelope value at frame `n`, in [0, 1].
    pub fn gain(&self, n: usize) -> f64 {
        if self.fade_len == 0 || n >= self.frame_count {
            return if n < self.frame_count { 1.0 } else { 0.0 };
        }
        let from_edge = if n < self.fade_len {
            n
        } else if n >= self.frame_count - self.fade_len {
            self.frame_count - 1 - n
        } else {
            return 1.0;
        };
        0.5 * (1.0 - (PI * from_edge as f64 / self.fade_len as f64).cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use more_asserts::{assert_gt, assert_le};

    #[test]
    fn ramps_are_monotonic() {
        let w = FadeWindow::new_with(1000, 100);
        assert_eq!(w.fade_len(), 100);
        assert_eq!(w.gain(0), 0.0);
        assert_eq!(w.gain(999), 0.0);
        assert_eq!(w.gain(500), 1.0);
        for n in 1..100 {
            assert_gt!(w.gain(n), w.gain(n - 1));
            assert_gt!(w.gain(999 - n), w.gain(1000 - n));
        }
        assert_le!(w.gain(99), 1.0);
    }

    #[test]
    fn fade_is_limited_to_half_the_buffer() {
        let w = FadeWindow::new_with(10, 100);
        assert_eq!(w.fade_len(), 5);
        let w = FadeWindow::new_with(1, 100);
        assert_eq!(w.fade_len(), 0);
        assert_eq!(w.gain(0), 1.0);
    }
}
