/// Draft text plus the "assistant is composing" flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    draft: String,
    composing: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the buffer verbatim.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// False exactly while the draft is empty or whitespace-only.
    pub fn can_submit(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub(crate) fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
    }

    /// Hands out the draft and clears it, or leaves a blank draft in place.
    pub(crate) fn take_draft(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }

        Some(std::mem::take(&mut self.draft))
    }
}
