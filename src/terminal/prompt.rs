//! Prompt rendering: `user@host:dir$ `

use super::surface::{RenderSurface, Segment, SegmentStyle};
use crate::session::Environment;

/// Build the styled prompt for an environment and working directory
#[must_use]
pub fn render_prompt(environment: &Environment, working_directory: &str) -> Vec<Segment> {
    vec![
        Segment::new(environment.user.as_str(), SegmentStyle::User),
        Segment::plain("@"),
        Segment::new(environment.host.as_str(), SegmentStyle::Host),
        Segment::plain(":"),
        Segment::new(working_directory, SegmentStyle::Path),
        Segment::plain("$ "),
    ]
}

/// Emit the prompt at the end of `surface`
pub fn write_prompt(surface: &mut RenderSurface, environment: &Environment, working_directory: &str) {
    surface.write_segments(&render_prompt(environment, working_directory));
}

/// Plain-text form of the prompt
#[must_use]
pub fn prompt_text(environment: &Environment, working_directory: &str) -> String {
    render_prompt(environment, working_directory)
        .into_iter()
        .map(|s| s.text)
        .collect()
}
