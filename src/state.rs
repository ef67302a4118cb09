/// What one pass of the slideshow loop did.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Step {
    Swapped { from: usize, to: usize },   // Next frame decoded, dwell elapsed, display switched
    DecodeFailed { index: usize, attempts: u32 }, // Pre-cache failed; current frame still shown
}
