//! Per-frame pass ordering.

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Geometry,
    Shadow,
    Lighting,
}

impl Pass {
    fn next(self) -> Pass {
        match self {
            Pass::Geometry => Pass::Shadow,
            Pass::Shadow => Pass::Lighting,
            Pass::Lighting => Pass::Geometry,
        }
    }
}

/// Enforces Geometry -> Shadow -> Lighting within every frame.
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    expected: Pass,
    frames: u64,
}

impl Default for FrameSequencer {
    fn default() -> Self {
        Self {
            expected: Pass::Geometry,
            frames: 0,
        }
    }
}

impl FrameSequencer {
    /// Marks `pass` as started. Fails without changing state if it is not the
    /// pass the frame expects next.
    pub fn begin(&mut self, pass: Pass) -> Result<(), RenderError> {
        if pass != self.expected {
            return Err(RenderError::PassOrder {
                expected: self.expected,
                requested: pass,
            });
        }

        if pass == Pass::Lighting {
            self.frames += 1;
        }
        self.expected = pass.next();
        Ok(())
    }

    pub fn expected(&self) -> Pass {
        self.expected
    }

    /// Frames that ran all three passes.
    pub fn completed_frames(&self) -> u64 {
        self.frames
    }

    /// Drops a half-finished frame, e.g. after the surface was lost.
    pub fn abandon(&mut self) {
        if self.expected != Pass::Geometry {
            log::debug!("Abandoning frame before {:?} pass", self.expected);
        }
        self.expected = Pass::Geometry;
    }
}
