pub mod briefing;
pub mod extraction;
pub mod gateway;
pub mod processor;
pub mod storage;
pub mod structuring;
