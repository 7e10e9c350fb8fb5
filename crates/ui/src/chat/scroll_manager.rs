use gpui::{Pixels, ScrollHandle, point, px};

/// Distance from the tail within which the feed counts as "at the bottom".
const NEAR_BOTTOM_THRESHOLD: Pixels = px(24.);
/// Ignore sub-pixel scroll jitter.
const SCROLL_EPSILON: f32 = 1.0;

/// One frame's scroll geometry. GPUI scrolls down with negative y offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollSample {
    offset_y: Pixels,
    max_offset_y: Pixels,
}

impl ScrollSample {
    const TOP: Self = Self {
        offset_y: Pixels::ZERO,
        max_offset_y: Pixels::ZERO,
    };

    fn is_near_bottom(self) -> bool {
        if self.max_offset_y <= Pixels::ZERO {
            return true;
        }
        (self.offset_y + self.max_offset_y).abs() <= NEAR_BOTTOM_THRESHOLD
    }
}

/// Decides whether the feed should keep following the newest message.
fn next_follow_state(
    following: bool,
    pending: bool,
    previous: ScrollSample,
    current: ScrollSample,
) -> bool {
    let offset_delta = f32::from(current.offset_y) - f32::from(previous.offset_y);
    let content_grew =
        (f32::from(current.max_offset_y) - f32::from(previous.max_offset_y)).abs() > SCROLL_EPSILON;

    if pending || (content_grew && previous.is_near_bottom()) {
        return true;
    }

    if content_grew {
        return following;
    }

    if following {
        // Scrolling toward older messages pauses following.
        offset_delta <= SCROLL_EPSILON
    } else {
        offset_delta < -SCROLL_EPSILON && current.is_near_bottom()
    }
}

/// Keeps the message feed pinned to its newest message unless the user
/// scrolled back through history.
pub struct ScrollManager {
    handle: ScrollHandle,
    following: bool,
    pending_scroll_to_bottom: bool,
    last_sample: ScrollSample,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            handle: ScrollHandle::new(),
            following: true,
            pending_scroll_to_bottom: false,
            last_sample: ScrollSample::TOP,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.handle
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    /// Jump to the tail on the next frame regardless of the follow state.
    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
        self.following = true;
    }

    /// Jump to the tail on the next frame only while following.
    pub fn request_scroll_to_bottom_if_following(&mut self) {
        if self.following || self.last_sample.is_near_bottom() {
            self.pending_scroll_to_bottom = true;
        }
    }

    /// Called when the feed switches to a different session.
    pub fn reset(&mut self) {
        self.last_sample = ScrollSample::TOP;
        self.request_scroll_to_bottom();
    }

    /// Samples the handle once per frame, then scrolls if required.
    pub fn prepare_frame(&mut self) {
        let current = self.sample();
        self.following = next_follow_state(
            self.following,
            self.pending_scroll_to_bottom,
            self.last_sample,
            current,
        );
        self.last_sample = current;

        if self.following || self.pending_scroll_to_bottom {
            let offset = self.handle.offset();
            let target_y = if current.max_offset_y > Pixels::ZERO {
                -current.max_offset_y
            } else {
                Pixels::ZERO
            };
            self.handle.set_offset(point(offset.x, target_y));
        }
        self.pending_scroll_to_bottom = false;
    }

    fn sample(&self) -> ScrollSample {
        ScrollSample {
            offset_y: self.handle.offset().y,
            max_offset_y: self.handle.max_offset().height,
        }
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(offset_y: f32, max_offset_y: f32) -> ScrollSample {
        ScrollSample {
            offset_y: px(offset_y),
            max_offset_y: px(max_offset_y),
        }
    }

    #[test]
    fn short_content_always_counts_as_bottom() {
        assert!(sample(0., 0.).is_near_bottom());
        assert!(sample(-390., 400.).is_near_bottom());
        assert!(!sample(-100., 400.).is_near_bottom());
    }

    #[test]
    fn scrolling_up_pauses_following() {
        let at_bottom = sample(-400., 400.);
        let scrolled_up = sample(-200., 400.);

        assert!(!next_follow_state(true, false, at_bottom, scrolled_up));
    }

    #[test]
    fn new_message_while_at_bottom_keeps_following() {
        let before = sample(-400., 400.);
        let grown = sample(-400., 480.);

        assert!(next_follow_state(true, false, before, grown));
        assert!(next_follow_state(false, false, before, grown));
    }

    #[test]
    fn new_message_while_reading_history_does_not_yank() {
        let reading = sample(-100., 400.);
        let grown = sample(-100., 480.);

        assert!(!next_follow_state(false, false, reading, grown));
    }

    #[test]
    fn returning_to_bottom_resumes_following() {
        let reading = sample(-100., 400.);
        let back_at_tail = sample(-395., 400.);

        assert!(next_follow_state(false, false, reading, back_at_tail));
    }

    #[test]
    fn explicit_request_overrides_paused_state() {
        let reading = sample(-100., 400.);

        assert!(next_follow_state(false, true, reading, reading));
    }

    #[test]
    fn request_marks_manager_following() {
        let mut manager = ScrollManager::new();
        manager.following = false;

        manager.request_scroll_to_bottom();

        assert!(manager.is_following());
        assert!(manager.pending_scroll_to_bottom);
    }
}
