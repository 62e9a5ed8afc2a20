use crate::Segment;

/// Render segments as plain text (one segment per line, no timestamps)
pub fn render_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
