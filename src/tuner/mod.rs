pub mod classifier;
pub mod coordinator;
pub mod editor;
pub mod session;
