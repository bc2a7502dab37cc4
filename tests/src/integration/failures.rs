//! # Failure Flows
//!
//! A store that rejects some writes. Failed comments go to the DLQ, are not
//! counted, and do not stop the pipeline.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::time::timeout;

    use comments_service::{
        CommentBusAdapter, CommentRepository, CommentService, InMemoryCommentRepository, Metrics,
    };
    use shared_bus::{ChannelEvent, EventPublisher, EventTopic, InMemoryEventBus, DLQ_CHANNEL};
    use shared_types::{Comment, ImageId, Message, RepositoryError};

    /// Rejects every comment for the configured image.
    struct RejectingRepository {
        inner: InMemoryCommentRepository,
        rejected_image: ImageId,
        attempts: Mutex<u64>,
    }

    impl RejectingRepository {
        fn new(rejected_image: &str) -> Self {
            Self {
                inner: InMemoryCommentRepository::new(),
                rejected_image: ImageId::from(rejected_image),
                attempts: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl CommentRepository for RejectingRepository {
        async fn save_all(&self, comments: Vec<Comment>) -> Result<Vec<Comment>, RepositoryError> {
            *self.attempts.lock() += 1;
            if comments.iter().any(|c| c.image_id == self.rejected_image) {
                return Err(RepositoryError::Unavailable("disk full".to_string()));
            }
            self.inner.save_all(comments).await
        }

        async fn delete_all(&self) -> Result<u64, RepositoryError> {
            self.inner.delete_all().await
        }

        async fn find_all(&self) -> Result<Vec<Comment>, RepositoryError> {
            self.inner.find_all().await
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            self.inner.count().await
        }
    }

    #[tokio::test]
    async fn test_failed_save_routes_to_dlq_and_continues() {
        let bus = Arc::new(InMemoryEventBus::new());
        let repository = Arc::new(RejectingRepository::new("bad"));
        let metrics = Arc::new(Metrics::new());
        let service = Arc::new(CommentService::new(repository.clone(), metrics.clone()));
        let mut adapter =
            CommentBusAdapter::new(bus.clone(), service, metrics.clone(), "input", "output")
                .unwrap();

        let mut output = bus.bind(["output"]).unwrap();
        let mut dlq = bus.bind([DLQ_CHANNEL]).unwrap();

        let failing = Message::new("input", Comment::new("bad", "lost"));
        let failing_id = failing.message_id;
        bus.publish(ChannelEvent::CommentReceived(failing))
            .await
            .unwrap();
        bus.publish(ChannelEvent::CommentReceived(Message::new(
            "input",
            Comment::new("good", "kept"),
        )))
        .await
        .unwrap();

        assert_eq!(adapter.drain().await, 2);
        let stats = adapter.stats();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.forwarded, 1);
        assert_eq!(stats.failed, 1);

        // Exactly one DLQ event, tied to the failing input
        let event = timeout(Duration::from_millis(100), dlq.recv())
            .await
            .unwrap()
            .expect("DLQ closed");
        assert_eq!(event.channel(), DLQ_CHANNEL);
        match event {
            ChannelEvent::CriticalError {
                source,
                message_id,
                error,
            } => {
                assert_eq!(source, "comments-service");
                assert_eq!(message_id, Some(failing_id));
                assert!(error.contains("disk full"));
            }
            other => panic!("Expected CriticalError event, got {:?}", other),
        }
        assert!(dlq.try_recv().unwrap().is_none());

        // Only the good comment is forwarded and counted
        match output.try_recv().unwrap() {
            Some(ChannelEvent::CommentSaved(msg)) => assert_eq!(msg.payload.comment, "kept"),
            other => panic!("Expected CommentSaved event, got {:?}", other),
        }
        assert!(output.try_recv().unwrap().is_none());

        assert_eq!(metrics.consumed("bad"), 0);
        assert_eq!(metrics.consumed("good"), 1);
        assert_eq!(metrics.snapshot().save_failures, 1);
        assert_eq!(*repository.attempts.lock(), 2);
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dlq_publication_is_counted() {
        let bus = Arc::new(InMemoryEventBus::new());
        let metrics = Arc::new(Metrics::new());
        let service = Arc::new(CommentService::new(
            Arc::new(RejectingRepository::new("bad")),
            metrics.clone(),
        ));
        let mut adapter =
            CommentBusAdapter::new(bus.clone(), service, metrics.clone(), "input", "output")
                .unwrap();
        let _dlq = bus.bind([DLQ_CHANNEL]).unwrap();

        bus.publish(ChannelEvent::CommentReceived(Message::new(
            "input",
            Comment::new("bad", "x"),
        )))
        .await
        .unwrap();
        adapter.drain().await;

        assert_eq!(metrics.published(EventTopic::DeadLetterQueue.as_str()), 1);
        assert_eq!(metrics.published(EventTopic::Output.as_str()), 0);
        assert_eq!(adapter.stats().undelivered, 0);
    }
}
