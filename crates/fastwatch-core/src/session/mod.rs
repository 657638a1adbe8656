mod snapshot;
mod transition;

pub use snapshot::{now_ms, HistoryRecord, SessionSnapshot};
pub use transition::{
    classify, NoopHooks, Transition, TransitionEngine, TransitionHooks, TransitionKind,
};
