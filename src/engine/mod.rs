// Purpose: block orchestration - event scheduling, dispatch, and the sample clock

pub mod allocator;
pub mod driver;
pub mod scheduler;

pub use allocator::VoiceAllocator;
pub use driver::BlockRenderer;
pub use scheduler::Scheduler;
