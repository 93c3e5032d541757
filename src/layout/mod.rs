pub mod engine;
pub mod grid;
pub mod inline;
pub mod limits;

pub use engine::{
    split_into_segments, ContentSizer, FixedHeight, GridLayoutEngine, MonthLayout, MonthView, Placement, Segment,
    Skyline,
};
pub use grid::{DayCell, MonthGrid};
pub use inline::{DayBlocks, InlineMonth, TaskBlock};
pub use limits::AdmissionPolicy;
