use std::fmt;

// All chat ids share one shape so allocation and display stay uniform.
macro_rules! define_chat_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}#{}", $label, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_chat_id!(SessionId, "session");
define_chat_id!(MessageId, "message");
define_chat_id!(ReplyTicket, "reply");

/// Monotonic id source. Never reuses a value, even across rapid allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub const fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Raw value the next call to [`IdCounter::allocate`] will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn allocate<T: From<u64>>(&mut self) -> T {
        let allocated = self.next;
        self.next = self.next.saturating_add(1);
        T::from(allocated)
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_hands_out_strictly_increasing_ids() {
        let mut counter = IdCounter::default();

        let first: SessionId = counter.allocate();
        let second: SessionId = counter.allocate();
        let third: MessageId = counter.allocate();

        assert_eq!(first, SessionId::new(1));
        assert_eq!(second, SessionId::new(2));
        assert_eq!(third.get(), 3);
        assert_eq!(counter.peek(), 4);
    }

    #[test]
    fn display_includes_kind_label() {
        assert_eq!(SessionId::new(7).to_string(), "session#7");
        assert_eq!(ReplyTicket::new(2).to_string(), "reply#2");
    }
}
