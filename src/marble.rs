//! Marble diagram grammar.
//!
//! | Symbol      | Meaning                                                |
//! |-------------|--------------------------------------------------------|
//! | `-`         | one tick passes                                        |
//! | `a`..`z`, digits | emit `Next` at the current frame                  |
//! | `(` … `)`   | group: every token inside shares one frame and the whole group takes one tick |
//! | `\|`        | emit `Complete`                                        |
//! | `#`         | emit `Error`                                           |
//! | `^`         | subscription start, or the origin of a hot producer   |
//! | `!`         | unsubscription                                         |
//! | whitespace  | ignored, takes no time                                 |
//!
//! One tick is [`MarbleConfig::tick_frames`](crate::config::MarbleConfig)
//! frames, 10 by default.

mod format;
mod parser;
mod value;

pub use format::format_sequence;
pub use parser::{MarbleParser, parse_sequence, parse_subscription_window};
pub use value::{ErrorMarker, MarbleValue, ValueMap};
