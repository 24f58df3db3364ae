// Operator-facing pieces: terminal file picker and console prompts

pub mod picker;
pub mod prompt;

pub use picker::{FilePicker, PickerOutcome, is_media_file, pick_file};
pub use prompt::{Answer, Console, is_yes};
