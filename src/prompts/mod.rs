pub mod enhance;

pub use enhance::{ENHANCE_TEMPERATURE, build_enhance_system_prompt, effective_model};
