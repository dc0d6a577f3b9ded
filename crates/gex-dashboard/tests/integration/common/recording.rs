//! Renderer that records every frame for assertions.

use gex_chart::{Card, CardView, ChartRenderer, ChartStyle};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub struct Frame {
    pub card: Card,
    pub view: CardView,
    pub style: ChartStyle,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Mutex<Vec<Frame>>,
}

impl RecordingRenderer {
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Most recent frame for `card`.
    pub fn last(&self, card: Card) -> Option<Frame> {
        self.frames
            .lock()
            .iter()
            .rev()
            .find(|f| f.card == card)
            .cloned()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, card: Card, view: &CardView, style: &ChartStyle) {
        self.frames.lock().push(Frame {
            card,
            view: view.clone(),
            style: style.clone(),
        });
    }
}
