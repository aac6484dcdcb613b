//! Submission controller: rate check, validation, persistence, feedback.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::form::{CommentForm, ReviewForm, SubmissionError, SubmissionOutcome};
use crate::clock::{Clock, SystemClock};
use crate::config::{GateConfig, RateLimitSettings};
use crate::identity::{client_hash, ClientFingerprint, FormToken};
use crate::notify::{NotificationKind, NotificationPresenter, NotificationSink};
use crate::ratelimit::{ActionKind, RateLimiter};
use crate::storage::{Comment, RecordStore, Review};
use crate::validation::{sanitize, SecurityValidator, ValidationResult};

/// Upper bound for page identifiers.
const MAX_CHARACTER_ID_LEN: usize = 100;

/// Stored user agents are cut to this many code points.
const MAX_USER_AGENT_LEN: usize = 100;

/// Runs comment and review submissions through the gate.
///
/// Each attempt moves through rate check, validation (first failure wins)
/// and persistence, and ends accepted or rejected with a notification shown
/// either way. Attempts are not de-duplicated: two overlapping submissions
/// of the same form are processed independently.
pub struct SubmissionController<S: RecordStore, C: Clock = SystemClock> {
    limiter: Arc<RateLimiter<C>>,
    presenter: Arc<NotificationPresenter<C>>,
    store: Arc<S>,
    validator: SecurityValidator,
    limits: RateLimitSettings,
    form_token: FormToken,
    clock: C,
}

impl<S: RecordStore> SubmissionController<S, SystemClock> {
    /// Build a controller and its collaborators from configuration.
    ///
    /// No background tasks are started. A long-lived host should run
    /// `limiter().spawn_cleanup(..)` and `presenter().spawn_dismissal(..)`,
    /// otherwise stale windows and expired notifications are only dropped
    /// when `cleanup` or `sweep` is called directly.
    pub fn from_config(config: &GateConfig, store: Arc<S>, sink: Arc<dyn NotificationSink>) -> Self {
        let clock = SystemClock::new();
        let limiter = Arc::new(RateLimiter::with_clock(clock, config.rate_limits.window()));
        let presenter = Arc::new(NotificationPresenter::new(sink, &config.notifications));
        Self::new(limiter, presenter, store, config, clock)
    }
}

impl<S: RecordStore, C: Clock> SubmissionController<S, C> {
    pub fn new(
        limiter: Arc<RateLimiter<C>>,
        presenter: Arc<NotificationPresenter<C>>,
        store: Arc<S>,
        config: &GateConfig,
        clock: C,
    ) -> Self {
        Self {
            limiter,
            presenter,
            store,
            validator: SecurityValidator::with_limits(config.validation.clone()),
            limits: config.rate_limits.clone(),
            form_token: FormToken::generate(),
            clock,
        }
    }

    /// Token to embed in review forms issued by this controller.
    pub fn form_token(&self) -> &FormToken {
        &self.form_token
    }

    pub fn limiter(&self) -> &Arc<RateLimiter<C>> {
        &self.limiter
    }

    pub fn presenter(&self) -> &Arc<NotificationPresenter<C>> {
        &self.presenter
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Submit a comment.
    #[instrument(skip(self, client, form), fields(character = %form.character_id))]
    pub async fn submit_comment(
        &self,
        client: &ClientFingerprint,
        form: &CommentForm,
    ) -> SubmissionOutcome<Comment> {
        let identity = client.identity_key();

        if !self.admit(ActionKind::Comment, &identity) {
            return self.reject(
                SubmissionError::RateLimited,
                "Too many comments. Please wait a minute before posting again.",
            );
        }

        let validated = self.validate_comment(form);
        let (character_id, author, text) = match validated {
            Ok(fields) => fields,
            Err(err) => return self.reject_invalid(err),
        };

        let comment = Comment {
            character_id,
            author,
            text,
            timestamp: self.clock.now(),
            user_agent: sanitize(&client.user_agent, MAX_USER_AGENT_LEN),
            client_hash: client_hash(&identity),
        };

        match self.store.append_comment(comment.clone()).await {
            Ok(()) => {
                info!(character = %comment.character_id, author = %comment.author, "Comment accepted");
                self.presenter
                    .show("Comment posted successfully!", NotificationKind::Success);
                SubmissionOutcome::Accepted(comment)
            }
            Err(e) => {
                error!(error = %e, "Error posting comment");
                self.reject(
                    SubmissionError::PersistenceFailed(e.to_string()),
                    "Failed to post comment. Please try again.",
                )
            }
        }
    }

    /// Submit a review.
    #[instrument(skip(self, client, form))]
    pub async fn submit_review(
        &self,
        client: &ClientFingerprint,
        form: &ReviewForm,
    ) -> SubmissionOutcome<Review> {
        let identity = client.identity_key();

        if !self.admit(ActionKind::Review, &identity) {
            return self.reject(
                SubmissionError::RateLimited,
                "Too many reviews. Please wait a minute before posting again.",
            );
        }

        if !self.form_token.matches(&form.form_token) {
            return self.reject(
                SubmissionError::TokenMismatch,
                "Security validation failed. Please refresh the page.",
            );
        }

        let review = match self.validate_review(form) {
            Ok(review) => review,
            Err(err) => return self.reject_invalid(err),
        };

        match self.store.append_review(review.clone()).await {
            Ok(()) => {
                info!(title = %review.title, "Review accepted");
                self.presenter
                    .show("Review posted successfully!", NotificationKind::Success);
                SubmissionOutcome::Accepted(review)
            }
            Err(e) => {
                error!(error = %e, "Error posting review");
                self.reject(
                    SubmissionError::PersistenceFailed(e.to_string()),
                    "Failed to post review. Please try again.",
                )
            }
        }
    }

    fn admit(&self, action: ActionKind, identity: &str) -> bool {
        self.limiter
            .is_allowed(&action.key_for(identity), self.limits.limit_for(action))
    }

    fn validate_comment(
        &self,
        form: &CommentForm,
    ) -> Result<(String, String, String), SubmissionError> {
        let author = field("name", self.validator.validate_name(&form.name))?;
        let text = field("comment", self.validator.validate_comment(&form.text))?;

        let character_id = sanitize(&form.character_id, MAX_CHARACTER_ID_LEN);
        if character_id.is_empty() {
            return Err(SubmissionError::ValidationFailed {
                field: "character",
                reason: "Unable to determine character page. Please refresh and try again."
                    .to_string(),
            });
        }

        Ok((character_id, author, text))
    }

    fn validate_review(&self, form: &ReviewForm) -> Result<Review, SubmissionError> {
        let title = field("title", self.validator.validate_review_title(&form.title))?;
        let summary = field(
            "summary",
            self.validator.validate_review_summary(&form.summary),
        )?;
        let review = field(
            "review",
            self.validator
                .validate_review_text(form.review.as_deref().unwrap_or_default()),
        )?;

        let optional = |value: &Option<String>| {
            self.validator
                .sanitize_field(value.as_deref().unwrap_or_default())
        };

        Ok(Review {
            title,
            kind: self.validator.sanitize_field(&form.kind),
            rating: self.validator.sanitize_field(&form.rating),
            genre: optional(&form.genre),
            summary,
            review,
            status: optional(&form.status),
            episodes: optional(&form.episodes),
            timestamp: self.clock.now(),
        })
    }

    fn reject_invalid<T>(&self, err: SubmissionError) -> SubmissionOutcome<T> {
        let message = match &err {
            SubmissionError::ValidationFailed { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        self.reject(err, &message)
    }

    fn reject<T>(&self, err: SubmissionError, message: &str) -> SubmissionOutcome<T> {
        warn!(reason = %err, "Submission rejected");
        self.presenter.show(message, NotificationKind::Error);
        SubmissionOutcome::Rejected(err)
    }
}

fn field(name: &'static str, result: ValidationResult) -> Result<String, SubmissionError> {
    result
        .into_result()
        .map_err(|reason| SubmissionError::ValidationFailed {
            field: name,
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::error::{GateError, Result};
    use crate::notify::RecordingSink;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Harness<S: RecordStore> {
        controller: SubmissionController<S, MockClock>,
        sink: Arc<RecordingSink>,
        clock: MockClock,
    }

    fn harness_with<S: RecordStore>(store: S) -> Harness<S> {
        let config = GateConfig::default();
        let clock = MockClock::at_millis(1_750_000_000_000);
        let sink = Arc::new(RecordingSink::new());
        let limiter = Arc::new(RateLimiter::with_clock(
            clock.clone(),
            config.rate_limits.window(),
        ));
        let presenter = Arc::new(NotificationPresenter::with_clock(
            sink.clone(),
            &config.notifications,
            clock.clone(),
        ));
        let controller =
            SubmissionController::new(limiter, presenter, Arc::new(store), &config, clock.clone());
        Harness {
            controller,
            sink,
            clock,
        }
    }

    fn harness() -> Harness<MemoryStore> {
        harness_with(MemoryStore::new())
    }

    fn client() -> ClientFingerprint {
        ClientFingerprint::new("Mozilla/5.0 (X11; Linux x86_64)", 1920, 1080)
    }

    fn comment_form(name: &str, text: &str) -> CommentForm {
        CommentForm {
            character_id: "saja".to_string(),
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    fn review_form(token: &str) -> ReviewForm {
        ReviewForm {
            form_token: token.to_string(),
            title: "Frieren".to_string(),
            summary: "A quiet fantasy epilogue.".to_string(),
            review: Some("Slow, <b>warm</b> and sad.".to_string()),
            kind: "anime".to_string(),
            rating: "5".to_string(),
            genre: Some("Fantasy".to_string()),
            status: None,
            episodes: Some("28".to_string()),
        }
    }

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn append_comment(&self, _comment: Comment) -> Result<()> {
            Err(GateError::Storage("backend unreachable".to_string()))
        }

        async fn list_comments(&self, _character_id: &str) -> Result<Vec<Comment>> {
            Ok(Vec::new())
        }

        async fn append_review(&self, _review: Review) -> Result<()> {
            Err(GateError::Storage("backend unreachable".to_string()))
        }

        async fn list_reviews(&self) -> Result<Vec<Review>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_minimum_boundary_comment_accepted() {
        let h = harness();

        let outcome = h
            .controller
            .submit_comment(&client(), &comment_form("Al", "0123456789"))
            .await;

        let comment = outcome.accepted().expect("comment should be accepted");
        assert_eq!(comment.author, "Al");
        assert_eq!(comment.text, "0123456789");
        assert_eq!(comment.character_id, "saja");
        assert_eq!(comment.client_hash, client_hash(&client().identity_key()));
        assert_eq!(
            h.sink.last_message().as_deref(),
            Some("Comment posted successfully!")
        );
        assert_eq!(h.controller.store().list_comments("saja").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fourth_comment_in_window_is_rate_limited() {
        let h = harness();
        let form = comment_form("Al", "0123456789");

        for _ in 0..3 {
            assert!(h.controller.submit_comment(&client(), &form).await.is_accepted());
        }

        let outcome = h.controller.submit_comment(&client(), &form).await;
        assert_eq!(outcome.rejection(), Some(&SubmissionError::RateLimited));
        assert_eq!(
            h.sink.last_message().as_deref(),
            Some("Too many comments. Please wait a minute before posting again.")
        );
        assert_eq!(h.controller.store().comment_count(), 3);

        h.clock.advance(Duration::from_secs(60));
        assert!(h.controller.submit_comment(&client(), &form).await.is_accepted());
    }

    #[tokio::test]
    async fn test_rejected_validation_still_consumes_budget() {
        let h = harness();

        for _ in 0..3 {
            let outcome = h
                .controller
                .submit_comment(&client(), &comment_form("A", "0123456789"))
                .await;
            assert!(!outcome.is_accepted());
        }

        let outcome = h
            .controller
            .submit_comment(&client(), &comment_form("Alice", "0123456789"))
            .await;
        assert_eq!(outcome.rejection(), Some(&SubmissionError::RateLimited));
    }

    #[tokio::test]
    async fn test_name_validated_before_comment() {
        let h = harness();

        let outcome = h
            .controller
            .submit_comment(&client(), &comment_form("A", "short"))
            .await;

        assert_eq!(
            outcome.rejection(),
            Some(&SubmissionError::ValidationFailed {
                field: "name",
                reason: "Name must be at least 2 characters long".to_string(),
            })
        );
        assert_eq!(
            h.sink.last_message().as_deref(),
            Some("Name must be at least 2 characters long")
        );
    }

    #[tokio::test]
    async fn test_character_checked_after_name_and_comment() {
        let h = harness();
        let mut form = comment_form("A", "short");
        form.character_id = String::new();

        let outcome = h.controller.submit_comment(&client(), &form).await;
        assert!(matches!(
            outcome.rejection(),
            Some(SubmissionError::ValidationFailed { field: "name", .. })
        ));

        form.name = "Alice".to_string();
        let outcome = h.controller.submit_comment(&client(), &form).await;
        assert!(matches!(
            outcome.rejection(),
            Some(SubmissionError::ValidationFailed { field: "comment", .. })
        ));
    }

    #[tokio::test]
    async fn test_short_comment_rejected() {
        let h = harness();

        let outcome = h
            .controller
            .submit_comment(&client(), &comment_form("Alice", "short"))
            .await;

        assert!(matches!(
            outcome.rejection(),
            Some(SubmissionError::ValidationFailed { field: "comment", .. })
        ));
        assert_eq!(h.controller.store().comment_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_character_rejected() {
        let h = harness();
        let mut form = comment_form("Alice", "This is long enough.");
        form.character_id = "  <p></p> ".to_string();

        let outcome = h.controller.submit_comment(&client(), &form).await;
        assert!(matches!(
            outcome.rejection(),
            Some(SubmissionError::ValidationFailed { field: "character", .. })
        ));
    }

    #[tokio::test]
    async fn test_comment_is_stored_sanitized() {
        let h = harness();

        let outcome = h
            .controller
            .submit_comment(
                &client(),
                &comment_form(" Alice ", "<script>alert(1)</script> Lovely art here"),
            )
            .await;

        let comment = outcome.accepted().unwrap();
        assert_eq!(comment.author, "Alice");
        assert_eq!(comment.text, "alert(1) Lovely art here");
    }

    #[tokio::test]
    async fn test_persistence_failure_is_rejected_not_propagated() {
        let h = harness_with(FailingStore);

        let outcome = h
            .controller
            .submit_comment(&client(), &comment_form("Alice", "This is long enough."))
            .await;

        assert!(matches!(
            outcome.rejection(),
            Some(SubmissionError::PersistenceFailed(_))
        ));
        assert_eq!(
            h.sink.last_message().as_deref(),
            Some("Failed to post comment. Please try again.")
        );
    }

    #[tokio::test]
    async fn test_review_accepted_with_token() {
        let h = harness();
        let token = h.controller.form_token().to_string();

        let outcome = h.controller.submit_review(&client(), &review_form(&token)).await;

        let review = outcome.accepted().expect("review should be accepted");
        assert_eq!(review.title, "Frieren");
        assert_eq!(review.review, "Slow, warm and sad.");
        assert_eq!(review.genre, "Fantasy");
        assert_eq!(review.status, "");
        assert_eq!(
            h.sink.last_message().as_deref(),
            Some("Review posted successfully!")
        );
        assert_eq!(h.controller.store().list_reviews().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_review_with_wrong_token_rejected() {
        let h = harness();

        let outcome = h.controller.submit_review(&client(), &review_form("forged")).await;

        assert_eq!(outcome.rejection(), Some(&SubmissionError::TokenMismatch));
        assert_eq!(
            h.sink.last_message().as_deref(),
            Some("Security validation failed. Please refresh the page.")
        );
    }

    #[tokio::test]
    async fn test_review_validation_order() {
        let h = harness();
        let token = h.controller.form_token().to_string();
        let mut form = review_form(&token);
        form.title = String::new();
        form.summary = "meh".to_string();

        let outcome = h.controller.submit_review(&client(), &form).await;
        assert_eq!(
            outcome.rejection(),
            Some(&SubmissionError::ValidationFailed {
                field: "title",
                reason: "Review title is required".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_review_and_comment_budgets_are_separate() {
        let h = harness();
        let token = h.controller.form_token().to_string();

        assert!(h.controller.submit_review(&client(), &review_form(&token)).await.is_accepted());
        assert!(h.controller.submit_review(&client(), &review_form(&token)).await.is_accepted());
        let third = h.controller.submit_review(&client(), &review_form(&token)).await;
        assert_eq!(third.rejection(), Some(&SubmissionError::RateLimited));
        assert_eq!(
            h.sink.last_message().as_deref(),
            Some("Too many reviews. Please wait a minute before posting again.")
        );

        let comment = h
            .controller
            .submit_comment(&client(), &comment_form("Alice", "This is long enough."))
            .await;
        assert!(comment.is_accepted());
    }

    #[tokio::test]
    async fn test_notifications_auto_dismiss() {
        let h = harness();
        h.controller
            .submit_comment(&client(), &comment_form("Alice", "This is long enough."))
            .await;
        assert_eq!(h.controller.presenter().active().len(), 1);

        h.clock.advance(Duration::from_millis(4000));
        assert_eq!(h.controller.presenter().sweep(), 1);
        assert!(h.controller.presenter().active().is_empty());
    }

    #[tokio::test]
    async fn test_spawned_dismissal_clears_controller_notifications() {
        let h = harness();
        h.controller
            .submit_comment(&client(), &comment_form("Alice", "This is long enough."))
            .await;
        h.controller
            .submit_comment(&client(), &comment_form("A", "short"))
            .await;
        assert_eq!(h.controller.presenter().active().len(), 2);

        h.clock.advance(Duration::from_millis(4000));
        let handle = h.controller.presenter().spawn_dismissal(Duration::from_millis(10));
        for _ in 0..50 {
            if h.controller.presenter().active().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(h.controller.presenter().active().is_empty());
        assert_eq!(h.sink.dismissed().len(), 2);
    }

    #[tokio::test]
    async fn test_from_config_uses_system_clock() {
        let controller = SubmissionController::from_config(
            &GateConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingSink::new()),
        );

        let outcome = controller
            .submit_comment(&client(), &comment_form("Alice", "This is long enough."))
            .await;
        assert!(outcome.is_accepted());
        assert_eq!(controller.limiter().key_count(), 1);
    }
}
