//! Prompt text for the content generation model.

/// Content slides requested when the user does not ask for a number.
pub const DEFAULT_SLIDE_COUNT: usize = 5;

/// Bullets required on each content slide and on the conclusion.
pub const BULLETS_PER_SLIDE: usize = 3;

/// System prompt describing the draft structure and its JSON shape.
pub fn system_prompt() -> String {
    format!(
        r#"You are a professional presentation content writer.
Create a detailed, informative presentation with this structure:

1. Title slide: a catchy title for the presentation.
2. Table of contents: the titles of ALL content slides, in order.
3. Content slides: {slides} slides unless the user asks for a specific number, in which case create exactly that many. Each slide has a title and exactly {bullets} descriptive bullet points, plus a short stock-photo search query describing a fitting image.
4. Conclusion: a summary of the key takeaways in exactly {bullets} concise bullet points.

Respond with a single JSON object of exactly this shape:
{{
  "presentation_title": "Main title",
  "table_of_contents": ["Slide 1 title", "Slide 2 title"],
  "slides": [
    {{
      "title": "Slide title",
      "content": ["Bullet point 1.", "Bullet point 2.", "Bullet point 3."],
      "image_description": "stock photo search query, e.g. 'business meeting'"
    }}
  ],
  "conclusion": {{
    "title": "Conclusion",
    "content": ["Takeaway 1", "Takeaway 2", "Takeaway 3"]
  }}
}}
Do not wrap the JSON in Markdown code fences."#,
        slides = DEFAULT_SLIDE_COUNT,
        bullets = BULLETS_PER_SLIDE
    )
}

/// User prompt for a first draft.
pub fn topic_prompt(topic: &str) -> String {
    format!("Create a presentation about: {}", topic.trim())
}

/// User prompt asking for a revised draft.
pub fn refine_prompt(topic: &str, current_draft: &str, feedback: &str) -> String {
    format!(
        "Presentation topic: {}\n\nCurrent content:\n{}\n\nUser feedback: {}\n\n\
         Refine the content based on the feedback. Return the full updated JSON.",
        topic.trim(),
        current_draft.trim(),
        feedback.trim()
    )
}
