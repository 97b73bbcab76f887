mod assembler;
mod style;
mod types;

pub use assembler::TimelineAssembler;
pub use style::{Palette, Rgba, Ring, TrackColoring, TrackStyle};
pub use types::{
    format_instant, iso_seconds, Clock, Interval, LineOfSightEntry, RenderHints, StationEntry,
    TimelineDocument, TrackEntry, TrackPoint, ISO_SECONDS,
};
