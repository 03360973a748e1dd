//! Fixed-size capture windows with double-buffered accumulation.

/// Default window length in frames (per channel).
///
/// At 44.1 kHz one window spans about 186 ms, at 48 kHz about 171 ms;
/// that cadence bounds both the analysis latency and the silence-timeout
/// granularity.
pub const DEFAULT_WINDOW_SIZE: usize = 8192;

/// One fixed-length block of deinterleaved stereo samples.
///
/// Only the left channel feeds the analysis pipeline; the right channel
/// is captured but reserved.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    /// Left-channel samples.
    pub left: Vec<f32>,
    /// Right-channel samples.
    pub right: Vec<f32>,
    /// Identifies which of the alternating buffers this is.
    pub tag: usize,
    fill: usize,
}

impl SampleWindow {
    fn new(size: usize, tag: usize) -> Self {
        Self {
            left: vec![0.0; size],
            right: vec![0.0; size],
            tag,
            fill: 0,
        }
    }

    /// Window length in frames.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether the window holds no frames at all.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Double-buffered window accumulator.
///
/// Interleaved device frames fill the active window; when it reaches the
/// window size the full window is handed to the consumer and accumulation
/// switches to the alternate buffer. Handoff happens only at a window
/// boundary, so the consumer never observes a torn window while the
/// producer keeps writing.
pub struct WindowAccumulator {
    buffers: [SampleWindow; 2],
    active: usize,
}

impl WindowAccumulator {
    /// Create an accumulator producing windows of `size` frames.
    pub fn new(size: usize) -> Self {
        Self {
            buffers: [SampleWindow::new(size, 0), SampleWindow::new(size, 1)],
            active: 0,
        }
    }

    /// Feed one interleaved device buffer.
    ///
    /// `channels` is the device channel count; the first channel maps to
    /// left and the second to right. Mono input is duplicated into both
    /// lanes and channels past the second are skipped. `on_window` fires
    /// once per completed window, on the calling thread.
    pub fn push_interleaved<F>(&mut self, data: &[f32], channels: usize, mut on_window: F)
    where
        F: FnMut(&mut SampleWindow),
    {
        if channels == 0 {
            return;
        }

        for frame in data.chunks_exact(channels) {
            let left = frame[0];
            let right = if channels > 1 { frame[1] } else { frame[0] };

            let window = &mut self.buffers[self.active];
            let i = window.fill;
            window.left[i] = left;
            window.right[i] = right;
            window.fill += 1;

            if window.fill == window.len() {
                on_window(&mut self.buffers[self.active]);

                self.active = 1 - self.active;
                self.buffers[self.active].fill = 0;
            }
        }
    }

    /// Frames accumulated in the window currently being filled.
    pub fn pending(&self) -> usize {
        self.buffers[self.active].fill
    }
}
