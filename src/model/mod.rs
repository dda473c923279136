pub mod prefs;
pub mod task;
pub mod template;
