pub mod render_config;
pub mod resume;

pub use render_config::{RenderConfig, Section, SectionKind, Theme};
pub use resume::ResumeData;
