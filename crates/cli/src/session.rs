//! Conversation state for the interactive `chat` command.
//!
//! The first message is the topic. While a draft is under review, a
//! confirmation renders it and anything else is feedback for a revision.

use deckgen_agents::DraftGenerator;
use deckgen_core::{
    build_presentation, is_error_output, parse_content, ContentTree, DeckRenderer, ImageProvider,
    RenderOptions,
};
use std::path::PathBuf;

/// Replies that accept the current draft.
pub const CONFIRMATIONS: [&str; 4] = ["yes", "y", "looks good", "ok"];

pub fn is_confirmation(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    CONFIRMATIONS.contains(&input.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    AwaitingTopic,
    Reviewing {
        topic: String,
        /// Raw generator output, re-sent verbatim with feedback.
        draft: String,
    },
}

/// Outcome of one user message.
#[derive(Debug)]
pub enum Reply {
    /// A new or revised draft is ready for review.
    Draft { tree: ContentTree, raw: String },
    /// The draft was rendered; the session is ready for a new topic.
    Rendered(PathBuf),
    /// Something failed; the session state is unchanged.
    Failed(String),
    /// Blank input.
    Ignored,
}

/// Drives generation, review and rendering for one user.
pub struct Session<'a> {
    state: SessionState,
    generator: &'a dyn DraftGenerator,
    images: Option<&'a dyn ImageProvider>,
    renderer: &'a dyn DeckRenderer,
    options: RenderOptions,
}

impl<'a> Session<'a> {
    pub fn new(
        generator: &'a dyn DraftGenerator,
        images: Option<&'a dyn ImageProvider>,
        renderer: &'a dyn DeckRenderer,
        options: RenderOptions,
    ) -> Self {
        Self {
            state: SessionState::default(),
            generator,
            images,
            renderer,
            options,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn handle(&mut self, input: &str) -> Reply {
        let input = input.trim();
        if input.is_empty() {
            return Reply::Ignored;
        }

        match &self.state {
            SessionState::AwaitingTopic => {
                let topic = input.to_string();
                let result = self.generator.generate(&topic);
                self.accept_draft(topic, result)
            }
            SessionState::Reviewing { draft, .. } if is_confirmation(input) => {
                match build_presentation(draft, &self.options, self.images, self.renderer) {
                    Ok(path) => {
                        self.state = SessionState::AwaitingTopic;
                        Reply::Rendered(path)
                    }
                    Err(e) => Reply::Failed(e.to_string()),
                }
            }
            SessionState::Reviewing { topic, draft } => {
                let topic = topic.clone();
                let result = self.generator.refine(&topic, draft, input);
                self.accept_draft(topic, result)
            }
        }
    }

    fn accept_draft(
        &mut self,
        topic: String,
        result: Result<String, deckgen_agents::GenerationError>,
    ) -> Reply {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => return Reply::Failed(deckgen_core::Error::from(e).to_string()),
        };
        if is_error_output(&raw) {
            return Reply::Failed(raw.trim().to_string());
        }

        match parse_content(&raw) {
            Ok(tree) => {
                self.state = SessionState::Reviewing {
                    topic,
                    draft: raw.clone(),
                };
                Reply::Draft { tree, raw }
            }
            Err(e) => Reply::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_agents::GenerationError;
    use deckgen_core::{Result as CoreResult, SlideDescriptor, Theme};
    use std::cell::RefCell;

    const DRAFT: &str = r#"{"presentation_title": "Graphs", "table_of_contents": ["Vertices"],
        "slides": [{"title": "Vertices", "content": ["Points"]}],
        "conclusion": {"title": "End", "content": ["Bye"]}}"#;

    const REVISED: &str = r#"{"presentation_title": "Graphs, revised", "table_of_contents": [],
        "slides": [], "conclusion": {"title": "End", "content": []}}"#;

    /// Records calls and replays queued responses.
    #[derive(Default)]
    struct ScriptedGenerator {
        responses: RefCell<Vec<std::result::Result<String, GenerationError>>>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn with(responses: Vec<std::result::Result<&str, GenerationError>>) -> Self {
            let mut responses: Vec<_> = responses
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect();
            responses.reverse();
            Self {
                responses: RefCell::new(responses),
                calls: RefCell::default(),
            }
        }

        fn next(&self) -> std::result::Result<String, GenerationError> {
            self.responses
                .borrow_mut()
                .pop()
                .unwrap_or(Err(GenerationError::EmptyContent))
        }
    }

    impl DraftGenerator for ScriptedGenerator {
        fn generate(&self, topic: &str) -> std::result::Result<String, GenerationError> {
            self.calls.borrow_mut().push(format!("generate:{}", topic));
            self.next()
        }

        fn refine(
            &self,
            topic: &str,
            current_draft: &str,
            feedback: &str,
        ) -> std::result::Result<String, GenerationError> {
            self.calls.borrow_mut().push(format!(
                "refine:{}:{}:{}",
                topic,
                current_draft.len(),
                feedback
            ));
            self.next()
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        renders: RefCell<usize>,
    }

    impl DeckRenderer for CountingRenderer {
        fn render(&self, slides: &[SlideDescriptor], _theme: &Theme) -> CoreResult<PathBuf> {
            *self.renders.borrow_mut() += 1;
            Ok(PathBuf::from(format!("deck_{}.pptx", slides.len())))
        }
    }

    #[test]
    fn test_confirmation_words() {
        for word in ["yes", "Y", "  Looks Good ", "OK"] {
            assert!(is_confirmation(word), "{}", word);
        }
        for word in ["yes please", "nope", "okay", ""] {
            assert!(!is_confirmation(word), "{}", word);
        }
    }

    #[test]
    fn test_topic_feedback_confirm_cycle() {
        let generator = ScriptedGenerator::with(vec![Ok(DRAFT), Ok(REVISED)]);
        let renderer = CountingRenderer::default();
        let mut session = Session::new(&generator, None, &renderer, RenderOptions::default());

        match session.handle("Intro to Graph Theory") {
            Reply::Draft { tree, .. } => assert_eq!(tree.presentation_title, "Graphs"),
            other => panic!("expected draft, got {:?}", other),
        }

        match session.handle("make it shorter") {
            Reply::Draft { tree, raw } => {
                assert_eq!(tree.presentation_title, "Graphs, revised");
                assert_eq!(raw, REVISED);
            }
            other => panic!("expected draft, got {:?}", other),
        }
        assert_eq!(
            *generator.calls.borrow(),
            vec![
                "generate:Intro to Graph Theory".to_string(),
                format!("refine:Intro to Graph Theory:{}:make it shorter", DRAFT.len()),
            ]
        );

        match session.handle("Looks good") {
            Reply::Rendered(path) => assert_eq!(path, PathBuf::from("deck_4.pptx")),
            other => panic!("expected render, got {:?}", other),
        }
        assert_eq!(*session.state(), SessionState::AwaitingTopic);
        assert_eq!(*renderer.renders.borrow(), 1);
    }

    #[test]
    fn test_generation_failure_keeps_state() {
        let generator = ScriptedGenerator::with(vec![
            Ok(DRAFT),
            Err(GenerationError::Api {
                status: 429,
                message: "rate limited".to_string(),
            }),
        ]);
        let renderer = CountingRenderer::default();
        let mut session = Session::new(&generator, None, &renderer, RenderOptions::default());

        session.handle("Graphs");
        let before = session.state().clone();

        match session.handle("more detail") {
            Reply::Failed(msg) => assert_eq!(msg, "Error: API error (status 429): rate limited"),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(*session.state(), before);
    }

    #[test]
    fn test_error_marker_and_malformed_drafts_are_rejected() {
        let generator =
            ScriptedGenerator::with(vec![Ok("Error: client not initialized"), Ok("not json")]);
        let renderer = CountingRenderer::default();
        let mut session = Session::new(&generator, None, &renderer, RenderOptions::default());

        match session.handle("Graphs") {
            Reply::Failed(msg) => assert_eq!(msg, "Error: client not initialized"),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(matches!(session.handle("Graphs"), Reply::Failed(_)));
        assert_eq!(*session.state(), SessionState::AwaitingTopic);
    }

    #[test]
    fn test_confirmation_before_any_draft_is_a_topic() {
        let generator = ScriptedGenerator::with(vec![Ok(DRAFT)]);
        let renderer = CountingRenderer::default();
        let mut session = Session::new(&generator, None, &renderer, RenderOptions::default());

        assert!(matches!(session.handle("yes"), Reply::Draft { .. }));
        assert_eq!(*generator.calls.borrow(), vec!["generate:yes".to_string()]);
        assert_eq!(*renderer.renders.borrow(), 0);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let generator = ScriptedGenerator::default();
        let renderer = CountingRenderer::default();
        let mut session = Session::new(&generator, None, &renderer, RenderOptions::default());

        assert!(matches!(session.handle("   "), Reply::Ignored));
        assert!(generator.calls.borrow().is_empty());
    }
}
