//! # Integration Test Flows
//!
//! The comment service wired to the shared bus the way the runtime wires it.
//!
//! ## Flow Tested:
//!
//! 1. **Input → Service**: `CommentReceived` on the input channel is saved
//! 2. **Service → Metrics**: `comments.consumed{imageId}` is incremented once per save
//! 3. **Service → Output**: `CommentSaved` carries the persisted comment, in input order
//! 4. **Startup reset**: queued input is processed against the emptied store
//! 5. **Backpressure**: input far beyond the queue size arrives complete

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;
    use proptest::prelude::*;
    use tokio::time::timeout;

    use comments_service::{
        CommentBusAdapter, CommentIngestionApi, CommentRepository, CommentService,
        InMemoryCommentRepository, Metrics,
    };
    use shared_bus::{ChannelEvent, EventPublisher, InMemoryEventBus, Subscription};
    use shared_types::{Comment, ImageId, Message};

    type Service = CommentService<InMemoryCommentRepository, Metrics>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Pipeline {
        bus: Arc<InMemoryEventBus>,
        repository: Arc<InMemoryCommentRepository>,
        metrics: Arc<Metrics>,
        service: Arc<Service>,
        adapter: CommentBusAdapter<Service, Metrics>,
        output: Subscription,
    }

    fn pipeline_with(repository: InMemoryCommentRepository) -> Pipeline {
        pipeline_on(InMemoryEventBus::new(), repository)
    }

    fn pipeline_on(bus: InMemoryEventBus, repository: InMemoryCommentRepository) -> Pipeline {
        let bus = Arc::new(bus);
        let repository = Arc::new(repository);
        let metrics = Arc::new(Metrics::new());
        let service = Arc::new(CommentService::new(repository.clone(), metrics.clone()));
        let adapter = CommentBusAdapter::new(
            bus.clone(),
            service.clone(),
            metrics.clone(),
            "input",
            "output",
        )
        .expect("input channel should be free");
        let output = bus.bind(["output"]).expect("output channel should be free");

        Pipeline {
            bus,
            repository,
            metrics,
            service,
            adapter,
            output,
        }
    }

    async fn publish_input(bus: &InMemoryEventBus, image_id: &str, text: &str) {
        let message = Message::new("input", Comment::new(image_id, text));
        bus.publish(ChannelEvent::CommentReceived(message))
            .await
            .expect("adapter should be bound to input");
    }

    async fn next_saved(output: &mut Subscription) -> Message<Comment> {
        match timeout(Duration::from_millis(500), output.recv())
            .await
            .expect("timeout waiting for CommentSaved")
            .expect("output channel closed")
        {
            ChannelEvent::CommentSaved(message) => message,
            other => panic!("Expected CommentSaved event, got {:?}", other),
        }
    }

    // =============================================================================
    // INTEGRATION TESTS: INPUT → SERVICE → OUTPUT
    // =============================================================================

    /// Three comments on two images: counts 2 and 1, three outputs in order
    #[tokio::test]
    async fn test_counts_per_image_and_forwards_in_order() {
        let mut p = pipeline_with(InMemoryCommentRepository::new());
        let adapter = tokio::spawn(p.adapter.run());

        for (image, text) in [("a", "one"), ("a", "two"), ("b", "three")] {
            publish_input(&p.bus, image, text).await;
        }

        let mut texts = Vec::new();
        for _ in 0..3 {
            let saved = next_saved(&mut p.output).await;
            assert_eq!(saved.channel, "output");
            assert!(saved.payload.is_persisted());
            texts.push(saved.payload.comment);
        }
        assert_eq!(texts, vec!["one", "two", "three"]);

        assert_eq!(p.metrics.consumed("a"), 2);
        assert_eq!(p.metrics.consumed("b"), 1);
        assert_eq!(p.repository.count().await.unwrap(), 3);

        p.bus.close("input");
        let stats = adapter.await.unwrap();
        assert_eq!(stats.forwarded, 3);
        assert_eq!(stats.failed, 0);
    }

    /// Forwarded message is a new envelope around the stored record
    #[tokio::test]
    async fn test_forwarded_envelope_is_fresh() {
        let mut p = pipeline_with(InMemoryCommentRepository::new());
        let input = Message::new("input", Comment::new("img-1", "hello"));
        let input_id = input.message_id;

        p.bus
            .publish(ChannelEvent::CommentReceived(input))
            .await
            .unwrap();
        p.adapter.drain().await;

        let saved = next_saved(&mut p.output).await;
        assert_ne!(saved.message_id, input_id);

        let stored = p.repository.find_all().await.unwrap();
        assert_eq!(stored, vec![saved.payload]);
    }

    /// Input published during the reset is queued and sees the empty store
    #[tokio::test]
    async fn test_reset_completes_before_queued_input() {
        let old = vec![Comment::new("old", "x"), Comment::new("old", "y")];
        let mut p = pipeline_with(InMemoryCommentRepository::with_comments(old));

        // Adapter is bound but not running yet
        publish_input(&p.bus, "new", "fresh").await;

        let removed = p.service.reset().await.unwrap();
        assert_eq!(removed, 2);

        assert_eq!(p.adapter.drain().await, 1);
        let stored = p.repository.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].image_id, ImageId::from("new"));
        assert_eq!(p.metrics.consumed("old"), 0);
    }

    /// The streaming form of the inbound port matches the bus flow
    #[tokio::test]
    async fn test_process_stream_through_service() {
        let p = pipeline_with(InMemoryCommentRepository::new());
        let input = futures::stream::iter(vec![
            Comment::new("a", "1"),
            Comment::new("b", "2"),
            Comment::new("a", "3"),
        ])
        .boxed();

        let out: Vec<Comment> = p
            .service
            .process(input)
            .map(|r| r.expect("save should succeed"))
            .collect()
            .await;

        let texts: Vec<&str> = out.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
        assert_eq!(p.metrics.snapshot().total_consumed, 3);
    }

    /// A queue of four carries thousands of comments without losing one
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_small_queues_apply_backpressure() {
        const N: usize = 5_000;
        let p = pipeline_on(
            InMemoryEventBus::with_capacity(4),
            InMemoryCommentRepository::new(),
        );
        let Pipeline {
            bus,
            repository,
            metrics,
            adapter,
            mut output,
            ..
        } = p;

        let adapter = tokio::spawn(adapter.run());
        let consumer = tokio::spawn(async move {
            let mut texts = Vec::new();
            while let Some(event) = output.recv().await {
                if let ChannelEvent::CommentSaved(msg) = event {
                    texts.push(msg.payload.comment);
                }
            }
            texts
        });

        for i in 0..N {
            publish_input(&bus, "a", &i.to_string()).await;
        }
        bus.close("input");
        let stats = timeout(Duration::from_secs(30), adapter)
            .await
            .expect("adapter should finish")
            .unwrap();
        bus.close("output");
        let texts = consumer.await.unwrap();

        let expected: Vec<String> = (0..N).map(|i| i.to_string()).collect();
        assert_eq!(texts, expected);
        assert_eq!(stats.forwarded, N as u64);
        assert_eq!(stats.undelivered, 0);
        assert_eq!(repository.count().await.unwrap(), N as u64);
        assert_eq!(metrics.consumed("a"), N as u64);
    }

    // =============================================================================
    // PROPERTY TESTS
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// N comments in: N persisted, N forwarded in order, one count each
        #[test]
        fn prop_n_in_n_out_over_bus(images in prop::collection::vec("[a-d]", 0..40)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                let mut p = pipeline_with(InMemoryCommentRepository::new());
                for (i, image) in images.iter().enumerate() {
                    publish_input(&p.bus, image, &i.to_string()).await;
                }
                p.adapter.drain().await;

                let mut forwarded = Vec::new();
                while let Ok(Some(ChannelEvent::CommentSaved(msg))) = p.output.try_recv() {
                    forwarded.push(msg.payload);
                }

                let expected: Vec<String> = (0..images.len()).map(|i| i.to_string()).collect();
                let got: Vec<String> = forwarded.iter().map(|c| c.comment.clone()).collect();
                assert_eq!(got, expected);
                assert_eq!(p.repository.count().await.unwrap(), images.len() as u64);

                for image in ["a", "b", "c", "d"] {
                    let want = images.iter().filter(|i| i.as_str() == image).count() as u64;
                    assert_eq!(p.metrics.consumed(image), want);
                }
            });
        }
    }
}
