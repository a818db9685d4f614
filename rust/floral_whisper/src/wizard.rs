//! Wizard Controller
//!
//! Sequences one bouquet session: collect sketches, collect gift details,
//! run the generation call, show the result. The current `WizardState` is
//! the only guard against overlapping submissions: the controller switches
//! to `Generating` before the call is dispatched and refuses to submit again
//! until the outcome is recorded.
//!
//! Submission is split into `begin_submit` and `finish_submit` so a UI can
//! render the `Generating` state while the request is in flight; `submit`
//! composes the two for callers that simply await.

use std::fmt;

use futures::future::{AbortHandle, Abortable, LocalBoxFuture};
use futures::FutureExt;

use crate::error::{GenerationError, ValidationError, WizardError};
use crate::generator::BouquetGenerator;
use crate::sketch::{EncodedImage, GeneratedArtifact, GiftDetails, Sketch};

/// Most flowers a bouquet can hold
pub const MAX_SKETCHES: usize = 5;

/// Labels of the progress stepper, indexed by `WizardState::step_index`
pub const STEP_LABELS: [&str; 3] = ["Art", "Message", "Gift"];

/// Phase of the wizard; exactly one is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// Sketching flowers (initial)
    Drawing,
    /// Entering sender, recipient and message
    Details,
    /// Waiting on the image service
    Generating,
    /// Showing the bouquet and card
    Final,
}

impl WizardState {
    /// Position in the three-step progress stepper
    pub fn step_index(self) -> usize {
        match self {
            Self::Drawing => 0,
            Self::Details | Self::Generating => 1,
            Self::Final => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drawing => "drawing",
            Self::Details => "details",
            Self::Generating => "generating",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message the UI should show the user once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MissingNames(ValidationError),
    GenerationFailed(GenerationError),
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingNames(_) => "Please fill in the sender and recipient names.",
            Self::GenerationFailed(_) => {
                "The floral studio is temporarily closed. Please try again in a moment."
            }
        }
    }
}

/// Everything the image service needs for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub sketches: Vec<Sketch>,
    pub sender: String,
    pub recipient: String,
}

impl GenerationRequest {
    /// Start the call as an abortable task
    ///
    /// Nothing runs until the task is awaited. Dropping the handle does not
    /// abort.
    pub fn dispatch<'a, G>(self, generator: &'a G) -> (GenerationTask<'a>, AbortHandle)
    where
        G: BouquetGenerator + ?Sized,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let call = async move {
            generator
                .generate_bouquet(&self.sketches, &self.sender, &self.recipient)
                .await
        }
        .boxed_local();
        (
            GenerationTask {
                inner: Abortable::new(call, registration),
            },
            handle,
        )
    }
}

/// An in-flight generation call
pub struct GenerationTask<'a> {
    inner: Abortable<LocalBoxFuture<'a, Result<EncodedImage, GenerationError>>>,
}

impl GenerationTask<'_> {
    /// Drive the call to completion; an abort resolves as `GenerationError::Aborted`
    pub async fn run(self) -> Result<EncodedImage, GenerationError> {
        match self.inner.await {
            Ok(outcome) => outcome,
            Err(_aborted) => Err(GenerationError::Aborted),
        }
    }
}

/// State machine for one bouquet session
#[derive(Debug, Clone)]
pub struct Wizard {
    state: WizardState,
    sketches: Vec<Sketch>,
    details: GiftDetails,
    artifact: Option<GeneratedArtifact>,
    notice: Option<Notice>,
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            state: WizardState::Drawing,
            sketches: Vec::new(),
            details: GiftDetails::default(),
            artifact: None,
            notice: None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn sketches(&self) -> &[Sketch] {
        &self.sketches
    }

    pub fn details(&self) -> &GiftDetails {
        &self.details
    }

    pub fn artifact(&self) -> Option<&GeneratedArtifact> {
        self.artifact.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Hand the pending notice to the UI, clearing it
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Append a finished sketch
    pub fn add_sketch(&mut self, image: EncodedImage) -> Result<&Sketch, WizardError> {
        self.expect_state(WizardState::Drawing, "add a sketch")?;
        if self.sketches.len() >= MAX_SKETCHES {
            return Err(WizardError::SketchLimitReached { max: MAX_SKETCHES });
        }

        let ordinal = self.sketches.len();
        self.sketches.push(Sketch::new(ordinal, image));
        log::info!("Saved sketch #{} ({}/{})", ordinal + 1, self.sketches.len(), MAX_SKETCHES);
        Ok(&self.sketches[ordinal])
    }

    /// Move on to the gift details once at least one flower exists
    pub fn advance_to_details(&mut self) -> Result<(), WizardError> {
        self.expect_state(WizardState::Drawing, "continue to details")?;
        if self.sketches.is_empty() {
            return Err(WizardError::NoSketches);
        }
        self.transition(WizardState::Details);
        Ok(())
    }

    /// Go back to drawing; sketches and details are kept
    pub fn edit_art(&mut self) -> Result<(), WizardError> {
        self.expect_state(WizardState::Details, "edit the art")?;
        self.transition(WizardState::Drawing);
        Ok(())
    }

    pub fn set_sender(&mut self, sender: impl Into<String>) -> Result<(), WizardError> {
        self.expect_state(WizardState::Details, "edit the sender")?;
        self.details.sender = sender.into();
        Ok(())
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) -> Result<(), WizardError> {
        self.expect_state(WizardState::Details, "edit the recipient")?;
        self.details.recipient = recipient.into();
        Ok(())
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> Result<(), WizardError> {
        self.expect_state(WizardState::Details, "edit the message")?;
        self.details.message = message.into();
        Ok(())
    }

    /// Validate the details and enter `Generating`
    ///
    /// On a validation failure a notice is raised and the state is unchanged.
    pub fn begin_submit(&mut self) -> Result<GenerationRequest, WizardError> {
        self.expect_state(WizardState::Details, "submit")?;
        if let Err(err) = self.details.validate() {
            log::warn!("Submit rejected: {}", err);
            self.notice = Some(Notice::MissingNames(err));
            return Err(err.into());
        }

        self.notice = None;
        self.transition(WizardState::Generating);
        Ok(GenerationRequest {
            sketches: self.sketches.clone(),
            sender: self.details.sender.clone(),
            recipient: self.details.recipient.clone(),
        })
    }

    /// Record the outcome of the call started by `begin_submit`
    ///
    /// Success stores the artifact and enters `Final`. Any failure, including
    /// an empty payload, raises a notice and returns to `Details` with all
    /// input intact.
    pub fn finish_submit(
        &mut self,
        outcome: Result<EncodedImage, GenerationError>,
    ) -> Result<&GeneratedArtifact, WizardError> {
        self.expect_state(WizardState::Generating, "finish generation")?;

        let outcome = outcome.and_then(|image| {
            if image.is_empty() {
                Err(GenerationError::NoImage)
            } else {
                Ok(image)
            }
        });

        match outcome {
            Ok(image) => {
                log::info!("✅ Bouquet generated ({} bytes, {})", image.len(), image.mime_type());
                self.transition(WizardState::Final);
                Ok(self.artifact.insert(GeneratedArtifact::new(image)))
            }
            Err(err) => {
                log::error!("Bouquet generation failed: {}", err);
                self.notice = Some(Notice::GenerationFailed(err.clone()));
                self.transition(WizardState::Details);
                Err(err.into())
            }
        }
    }

    /// Validate, call the generator once, and record the outcome
    pub async fn submit<G>(&mut self, generator: &G) -> Result<&GeneratedArtifact, WizardError>
    where
        G: BouquetGenerator + ?Sized,
    {
        let request = self.begin_submit()?;
        log::info!(
            "Requesting bouquet of {} sketches from {:?} for {:?}",
            request.sketches.len(),
            request.sender,
            request.recipient
        );
        let (task, _abort) = request.dispatch(generator);
        let outcome = task.run().await;
        self.finish_submit(outcome)
    }

    /// Discard the session and start over at `Drawing`
    ///
    /// Refused while a generation call is in flight.
    pub fn reset(&mut self) -> Result<(), WizardError> {
        if self.state == WizardState::Generating {
            return Err(WizardError::InvalidTransition {
                state: self.state,
                action: "start over",
            });
        }
        self.sketches.clear();
        self.details = GiftDetails::default();
        self.artifact = None;
        self.notice = None;
        self.transition(WizardState::Drawing);
        Ok(())
    }

    /// At least one flower has been drawn
    pub fn can_continue(&self) -> bool {
        !self.sketches.is_empty()
    }

    /// The canvas is offered only while there is room for another flower
    pub fn can_draw_more(&self) -> bool {
        self.sketches.len() < MAX_SKETCHES
    }

    /// Zero-based index of the flower being drawn next
    pub fn next_flower_index(&self) -> usize {
        self.sketches.len()
    }

    /// Caption of the continue button, e.g. "Proceed with 2 Flowers"
    pub fn proceed_label(&self) -> String {
        let count = self.sketches.len();
        let plural = if count > 1 { "s" } else { "" };
        format!("Proceed with {count} Flower{plural}")
    }

    fn expect_state(&self, expected: WizardState, action: &'static str) -> Result<(), WizardError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    fn transition(&mut self, to: WizardState) {
        log::info!("Wizard: {} -> {}", self.state, to);
        self.state = to;
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::cell::RefCell;

    /// Records every call and answers with a canned outcome
    struct FakeGenerator {
        outcome: Result<EncodedImage, GenerationError>,
        calls: RefCell<Vec<(Vec<Sketch>, String, String)>>,
    }

    impl FakeGenerator {
        fn answering(outcome: Result<EncodedImage, GenerationError>) -> Self {
            Self {
                outcome,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    #[async_trait(?Send)]
    impl BouquetGenerator for FakeGenerator {
        async fn generate_bouquet(
            &self,
            sketches: &[Sketch],
            sender: &str,
            recipient: &str,
        ) -> Result<EncodedImage, GenerationError> {
            self.calls
                .borrow_mut()
                .push((sketches.to_vec(), sender.to_string(), recipient.to_string()));
            self.outcome.clone()
        }
    }

    fn sketch_image(tag: u8) -> EncodedImage {
        EncodedImage::png(vec![0x89, b'P', b'N', b'G', tag])
    }

    fn wizard_in_details(sender: &str, recipient: &str) -> Wizard {
        let mut wizard = Wizard::new();
        wizard.add_sketch(sketch_image(b'A')).expect("room for a sketch");
        wizard.advance_to_details().expect("one sketch drawn");
        wizard.set_sender(sender).expect("details editable");
        wizard.set_recipient(recipient).expect("details editable");
        wizard
    }

    #[test]
    fn test_starts_in_drawing() {
        let wizard = Wizard::new();
        assert_eq!(wizard.state(), WizardState::Drawing);
        assert!(wizard.sketches().is_empty());
        assert!(wizard.artifact().is_none());
        assert!(!wizard.can_continue());
        assert!(wizard.can_draw_more());
    }

    #[test]
    fn test_sketches_get_ordinals_in_order() {
        let mut wizard = Wizard::new();
        wizard.add_sketch(sketch_image(1)).expect("first");
        wizard.add_sketch(sketch_image(2)).expect("second");

        let ordinals: Vec<usize> = wizard.sketches().iter().map(Sketch::ordinal).collect();
        assert_eq!(ordinals, vec![0, 1]);
        assert_eq!(wizard.sketches()[1].image(), &sketch_image(2));
        assert_eq!(wizard.next_flower_index(), 2);
    }

    #[test]
    fn test_sixth_sketch_is_rejected() {
        let mut wizard = Wizard::new();
        for tag in 0..MAX_SKETCHES as u8 {
            wizard.add_sketch(sketch_image(tag)).expect("within limit");
        }
        assert!(!wizard.can_draw_more());

        let err = wizard.add_sketch(sketch_image(9)).unwrap_err();
        assert_eq!(err, WizardError::SketchLimitReached { max: MAX_SKETCHES });
        assert_eq!(wizard.sketches().len(), MAX_SKETCHES);
    }

    #[test]
    fn test_advance_requires_a_sketch() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.advance_to_details(), Err(WizardError::NoSketches));
        assert_eq!(wizard.state(), WizardState::Drawing);

        wizard.add_sketch(sketch_image(1)).expect("room");
        wizard.advance_to_details().expect("has a sketch");
        assert_eq!(wizard.state(), WizardState::Details);
    }

    #[test]
    fn test_edit_art_keeps_everything() {
        let mut wizard = wizard_in_details("Mia", "Sam");
        wizard.set_message("Happy spring").expect("editable");

        wizard.edit_art().expect("details -> drawing");
        assert_eq!(wizard.state(), WizardState::Drawing);
        assert_eq!(wizard.sketches().len(), 1);
        assert_eq!(wizard.details().sender, "Mia");
        assert_eq!(wizard.details().message, "Happy spring");

        wizard.add_sketch(sketch_image(b'B')).expect("room for more");
        wizard.advance_to_details().expect("back to details");
        assert_eq!(wizard.details().recipient, "Sam");
    }

    #[test]
    fn test_details_are_locked_outside_details() {
        let mut wizard = Wizard::new();
        assert!(matches!(
            wizard.set_sender("Mia"),
            Err(WizardError::InvalidTransition { state: WizardState::Drawing, .. })
        ));
        assert_eq!(wizard.details(), &GiftDetails::default());
    }

    #[test]
    fn test_submit_success_enters_final() {
        let mut wizard = wizard_in_details("Mia", "Sam");
        let payload = EncodedImage::png(vec![7, 7, 7]);
        let generator = FakeGenerator::answering(Ok(payload.clone()));

        let artifact = pollster::block_on(wizard.submit(&generator)).expect("generated");
        assert_eq!(artifact.image(), &payload);
        assert_eq!(wizard.state(), WizardState::Final);
        assert_eq!(wizard.artifact().map(GeneratedArtifact::image), Some(&payload));

        let calls = generator.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, wizard.sketches().to_vec());
        assert_eq!(calls[0].1, "Mia");
        assert_eq!(calls[0].2, "Sam");
    }

    #[test]
    fn test_submit_failure_returns_to_details_with_notice() {
        let mut wizard = wizard_in_details("Mia", "Sam");
        let generator = FakeGenerator::answering(Err(GenerationError::Transport("offline".into())));

        let err = pollster::block_on(wizard.submit(&generator)).unwrap_err();
        assert_eq!(err, WizardError::Generation(GenerationError::Transport("offline".into())));
        assert_eq!(wizard.state(), WizardState::Details);
        assert_eq!(wizard.details().sender, "Mia");
        assert_eq!(wizard.details().recipient, "Sam");
        assert_eq!(wizard.sketches().len(), 1);
        assert!(wizard.artifact().is_none());

        let notice = wizard.take_notice().expect("notice raised");
        assert!(matches!(notice, Notice::GenerationFailed(_)));
        assert!(notice.message().starts_with("The floral studio"));
        assert!(wizard.notice().is_none());
    }

    #[test]
    fn test_empty_payload_counts_as_failure() {
        let mut wizard = wizard_in_details("Mia", "Sam");
        let generator = FakeGenerator::answering(Ok(EncodedImage::png(Vec::new())));

        let err = pollster::block_on(wizard.submit(&generator)).unwrap_err();
        assert_eq!(err, WizardError::Generation(GenerationError::NoImage));
        assert_eq!(wizard.state(), WizardState::Details);
    }

    #[test]
    fn test_missing_names_never_dispatch() {
        for (sender, recipient) in [("", "Sam"), ("Mia", ""), ("  ", "Sam"), ("", "")] {
            let mut wizard = wizard_in_details(sender, recipient);
            let generator = FakeGenerator::answering(Ok(sketch_image(0)));

            let err = pollster::block_on(wizard.submit(&generator)).unwrap_err();
            assert!(matches!(err, WizardError::Validation(_)));
            assert_eq!(wizard.state(), WizardState::Details);
            assert_eq!(generator.call_count(), 0);
            assert_eq!(
                wizard.notice().map(Notice::message),
                Some("Please fill in the sender and recipient names.")
            );
        }
    }

    #[test]
    fn test_second_submit_rejected_while_generating() {
        let mut wizard = wizard_in_details("Mia", "Sam");
        let _request = wizard.begin_submit().expect("valid details");
        assert_eq!(wizard.state(), WizardState::Generating);
        assert_eq!(wizard.state().step_index(), 1);

        assert!(matches!(
            wizard.begin_submit(),
            Err(WizardError::InvalidTransition { state: WizardState::Generating, .. })
        ));
        assert!(wizard.set_recipient("Someone else").is_err());
        assert!(wizard.reset().is_err());
        assert_eq!(wizard.state(), WizardState::Generating);
    }

    #[test]
    fn test_finish_without_begin_is_rejected() {
        let mut wizard = wizard_in_details("Mia", "Sam");
        assert!(wizard.finish_submit(Ok(sketch_image(1))).is_err());
        assert_eq!(wizard.state(), WizardState::Details);
        assert!(wizard.artifact().is_none());
    }

    #[test]
    fn test_aborted_task_is_a_failure() {
        let mut wizard = wizard_in_details("Mia", "Sam");
        let generator = FakeGenerator::answering(Ok(sketch_image(1)));

        let request = wizard.begin_submit().expect("valid details");
        let (task, abort) = request.dispatch(&generator);
        abort.abort();
        let outcome = pollster::block_on(task.run());
        assert_eq!(outcome, Err(GenerationError::Aborted));
        assert_eq!(generator.call_count(), 0);

        assert!(wizard.finish_submit(outcome).is_err());
        assert_eq!(wizard.state(), WizardState::Details);
    }

    #[test]
    fn test_reset_after_final_clears_session() {
        let mut wizard = wizard_in_details("Mia", "Sam");
        wizard.set_message("For you").expect("editable");
        let generator = FakeGenerator::answering(Ok(sketch_image(1)));
        pollster::block_on(wizard.submit(&generator)).expect("generated");
        assert_eq!(wizard.state().step_index(), 2);

        wizard.reset().expect("reset from final");
        assert_eq!(wizard.state(), WizardState::Drawing);
        assert!(wizard.sketches().is_empty());
        assert_eq!(wizard.details(), &GiftDetails::default());
        assert!(wizard.artifact().is_none());
    }

    #[test]
    fn test_proceed_label_pluralizes() {
        let mut wizard = Wizard::new();
        wizard.add_sketch(sketch_image(1)).expect("room");
        assert_eq!(wizard.proceed_label(), "Proceed with 1 Flower");
        wizard.add_sketch(sketch_image(2)).expect("room");
        assert_eq!(wizard.proceed_label(), "Proceed with 2 Flowers");
    }

    #[test]
    fn test_step_labels_follow_states() {
        assert_eq!(STEP_LABELS[WizardState::Drawing.step_index()], "Art");
        assert_eq!(STEP_LABELS[WizardState::Details.step_index()], "Message");
        assert_eq!(STEP_LABELS[WizardState::Final.step_index()], "Gift");
    }

    proptest! {
        #[test]
        fn prop_sketch_count_never_exceeds_limit(adds in 0usize..20) {
            let mut wizard = Wizard::new();
            for i in 0..adds {
                let result = wizard.add_sketch(sketch_image(i as u8));
                prop_assert_eq!(result.is_ok(), i < MAX_SKETCHES);
                prop_assert!(wizard.sketches().len() <= MAX_SKETCHES);
            }
            prop_assert_eq!(wizard.sketches().len(), adds.min(MAX_SKETCHES));
        }
    }
}
