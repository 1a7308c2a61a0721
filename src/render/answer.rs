//! The AI answer panel: hidden until the first render, never hidden again.

use super::AnswerTarget;

pub struct AnswerRenderer<T: AnswerTarget> {
    target: T,
    shown: bool,
}

impl<T: AnswerTarget> AnswerRenderer<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            shown: false,
        }
    }

    /// Replace the panel content with `html` and make the panel visible.
    /// Last write wins.
    pub fn render(&mut self, html: &str) {
        self.target.set_content(html);
        if !self.shown {
            self.target.show();
            self.shown = true;
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }
}
