//! View derivation.
//!
//! One shared pipeline turns a snapshot and the user's [`ViewState`] into the
//! ordered list a front end renders. Front-end specific stages (category,
//! favorites) are switched on through [`ViewOptions`].

mod pipeline;
mod state;
mod summary;
mod time;

pub use pipeline::{apply, sort};
pub use state::{SortMode, ViewOptions, ViewState};
pub use summary::{ViewSummary, all_tags, share_text, tag_counts};
pub use time::humanize_since;
