/// Orchestrator tests against the in-memory backend
///
/// These cover the coordination rules:
/// 1. The create path returns the backend's raw shape
/// 2. The read paths normalize, summarize and compare
/// 3. The harvest flow feeds trimmed stdout back as the expected output
/// 4. Batch reads come back in requested order

#[cfg(test)]
mod orchestrator_tests {
    use std::sync::Arc;

    use crate::error::{ErrorKind, RelayError};
    use crate::fakes::{accepted, FakeBackend};
    use crate::orchestrator::{process_result, Orchestrator};
    use judge_relay_common::status::StatusCategory;
    use judge_relay_common::types::{
        Difference, OutputComparison, RawSubmission, StatusRef, Submission, SubmitOptions,
    };

    fn setup() -> (Arc<FakeBackend>, Orchestrator) {
        let backend = Arc::new(FakeBackend::new());
        let orchestrator = Orchestrator::new(backend.clone());
        (backend, orchestrator)
    }

    fn submission(expected: Option<&str>) -> Submission {
        Submission {
            source_code: "print('Hello, World!')".to_string(),
            language_id: 71,
            stdin: String::new(),
            expected_output: expected.map(str::to_string),
        }
    }

    const HARVEST: SubmitOptions = SubmitOptions {
        use_actual_as_expected: true,
    };

    #[tokio::test]
    async fn test_submit_returns_raw_shape() {
        let (backend, orchestrator) = setup();
        backend.push_submit_response(accepted("DEBUG: x\n42\n"));

        let raw = orchestrator
            .submit(&submission(Some("42")), SubmitOptions::default())
            .await
            .unwrap();

        // Raw stdout, not the normalized form
        assert_eq!(raw.stdout.as_deref(), Some("DEBUG: x\n42\n"));
        assert!(raw.metadata.is_none());
        assert_eq!(backend.submitted().len(), 1);
        assert_eq!(backend.submitted()[0].expected_output.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_get_normalizes_and_compares() {
        let (backend, orchestrator) = setup();
        backend.insert(RawSubmission {
            token: Some("t1".into()),
            expected_output: Some("Hello, World!".into()),
            ..accepted("Generated greeting: Hello, World!\nHello, World!\n")
        });

        let result = orchestrator.get("t1").await.unwrap();

        assert_eq!(result.token.as_deref(), Some("t1"));
        assert_eq!(result.output.stdout.actual.as_deref(), Some("Hello, World!"));
        assert_eq!(
            result.output.stdout.logs.as_deref(),
            Some("Generated greeting: Hello, World!")
        );
        assert!(result.execution_summary.success);
        assert_eq!(result.execution_summary.status_category, StatusCategory::Success);
        match result.output_comparison {
            Some(OutputComparison::Compared(c)) => {
                assert!(c.exact_match);
                assert!(c.differences.is_empty());
            }
            other => panic!("expected a comparison, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_without_expected_output_skips_comparison() {
        let (backend, orchestrator) = setup();
        backend.insert(RawSubmission {
            token: Some("t2".into()),
            ..accepted("7")
        });

        let result = orchestrator.get("t2").await.unwrap();

        assert!(result.output_comparison.is_none());
        assert_eq!(result.output.stdout.actual.as_deref(), Some("7"));
    }

    #[test]
    fn test_noise_only_stdout_skips_comparison() {
        let result = process_result(RawSubmission {
            expected_output: Some("5".into()),
            ..accepted("DEBUG: nothing useful")
        });
        assert!(result.output.stdout.actual.is_none());
        assert!(result.output_comparison.is_none());
    }

    #[test]
    fn test_mismatch_is_explained() {
        let result = process_result(RawSubmission {
            expected_output: Some("hello".into()),
            status: Some(StatusRef {
                id: Some(4),
                description: Some("Wrong Answer".into()),
            }),
            ..accepted("HELLO\n")
        });

        assert_eq!(result.execution_summary.status_category, StatusCategory::Wrong);
        assert!(!result.execution_summary.success);
        match result.output_comparison {
            Some(OutputComparison::Compared(c)) => {
                assert!(!c.exact_match);
                assert!(c.case_insensitive_match);
                assert!(c.differences.contains(&Difference::ContentDifference));
            }
            other => panic!("expected a comparison, got {other:?}"),
        }
    }

    #[test]
    fn test_process_result_normalizes_every_stream() {
        let result = process_result(RawSubmission {
            stderr: Some("WARNING: deprecated\nTraceback\n".into()),
            compile_output: None,
            language_id: Some(71),
            ..accepted("")
        });

        assert_eq!(result.language.id, Some(71));
        assert_eq!(result.output.stderr.actual.as_deref(), Some("Traceback"));
        assert_eq!(result.output.stderr.logs.as_deref(), Some("WARNING: deprecated"));
        assert!(result.output.compile_output.raw.is_none());
        assert!(result.output.stdout.lines.is_empty());
    }

    #[tokio::test]
    async fn test_harvest_flow_uses_trimmed_stdout() {
        let (backend, orchestrator) = setup();
        backend.push_submit_response(RawSubmission {
            token: Some("first".into()),
            ..accepted("  42  \n")
        });
        backend.push_submit_response(RawSubmission {
            token: Some("second".into()),
            ..accepted("  42  \n")
        });

        let raw = orchestrator
            .submit(&submission(Some("ignored")), HARVEST)
            .await
            .unwrap();

        let submitted = backend.submitted();
        assert_eq!(submitted.len(), 2);
        assert!(submitted[0].expected_output.is_none());
        assert_eq!(submitted[1].expected_output.as_deref(), Some("42"));
        assert_eq!(submitted[1].source_code, submitted[0].source_code);

        assert_eq!(raw.token.as_deref(), Some("second"));
        let metadata = raw.metadata.expect("harvest metadata");
        assert!(metadata.used_actual_as_expected);
        assert_eq!(metadata.extracted_output, "42");
        assert_eq!(metadata.first_submission_token, "first");
    }

    #[tokio::test]
    async fn test_harvest_fails_on_blank_stdout() {
        let (backend, orchestrator) = setup();
        backend.push_submit_response(accepted("   \n"));

        let err = orchestrator
            .submit(&submission(None), HARVEST)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(err.to_string().contains("No raw output found"));
        // No second run
        assert_eq!(backend.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_harvest_propagates_backend_failure() {
        let (backend, orchestrator) = setup();
        backend.push_submit_error(RelayError::backend(
            "create submission",
            Some(422),
            "language with id 999 doesn't exist",
        ));

        let err = orchestrator
            .submit(&submission(None), HARVEST)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.to_string().contains("language with id 999"));
    }

    #[tokio::test]
    async fn test_run_attaches_harvest_metadata_to_normalized_result() {
        let (backend, orchestrator) = setup();
        backend.push_submit_response(accepted("Result: 10\n10\n"));
        backend.push_submit_response(accepted("Result: 10\n10\n"));

        let result = orchestrator.run(&submission(None), HARVEST).await.unwrap();

        assert_eq!(result.expected_output.as_deref(), Some("Result: 10\n10"));
        assert_eq!(result.output.stdout.actual.as_deref(), Some("Result: 10\n10"));
        let metadata = result.metadata.expect("metadata");
        assert_eq!(metadata.extracted_output, "Result: 10\n10");
        assert_eq!(metadata.first_submission_token, "fake-token-1");
        assert!(result.output_comparison.unwrap().is_exact_match());
    }

    #[tokio::test]
    async fn test_run_without_harvest() {
        let (backend, orchestrator) = setup();
        backend.push_submit_response(accepted("hi\n"));

        let result = orchestrator
            .run(&submission(Some("hi")), SubmitOptions::default())
            .await
            .unwrap();

        assert!(result.metadata.is_none());
        assert_eq!(result.source_code.as_deref(), Some("print('Hello, World!')"));
        assert!(result.output_comparison.unwrap().is_exact_match());
    }

    #[tokio::test]
    async fn test_batch_submit_passes_through() {
        let (backend, orchestrator) = setup();
        let batch = vec![submission(None), submission(Some("x"))];

        let response = orchestrator.batch_submit(&batch).await.unwrap();

        let tokens = response.as_array().expect("array response");
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0]["token"].is_string());
        assert_eq!(backend.batches(), vec![batch]);
    }

    #[tokio::test]
    async fn test_batch_get_restores_requested_order() {
        let (backend, orchestrator) = setup();
        for (token, out) in [("a", "1"), ("b", "2"), ("c", "3")] {
            backend.insert(RawSubmission {
                token: Some(token.into()),
                ..accepted(out)
            });
        }
        backend.reverse_batch_order();

        let tokens: Vec<String> = ["b", "c", "a"].iter().map(|t| t.to_string()).collect();
        let results = orchestrator.batch_get(&tokens).await.unwrap();

        let order: Vec<Option<&str>> = results.iter().map(|r| r.token.as_deref()).collect();
        assert_eq!(order, vec![Some("b"), Some("c"), Some("a")]);
        let outputs: Vec<Option<&str>> = results
            .iter()
            .map(|r| r.output.stdout.actual.as_deref())
            .collect();
        assert_eq!(outputs, vec![Some("2"), Some("3"), Some("1")]);
    }

    #[tokio::test]
    async fn test_batch_get_repeated_token() {
        let (backend, orchestrator) = setup();
        backend.insert(RawSubmission {
            token: Some("a".into()),
            ..accepted("1")
        });

        let tokens = vec!["a".to_string(), "a".to_string()];
        let results = orchestrator.batch_get(&tokens).await.unwrap();

        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_get_missing_token_fails() {
        let (backend, orchestrator) = setup();
        backend.insert(RawSubmission {
            token: Some("a".into()),
            ..accepted("1")
        });

        let tokens = vec!["a".to_string(), "missing".to_string()];
        let err = orchestrator.batch_get(&tokens).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let (backend, orchestrator) = setup();
        backend.set_unavailable(true);

        let err = orchestrator.get("t").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let err = orchestrator
            .submit(&submission(None), SubmitOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(backend.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_listings_pass_through() {
        let (_backend, orchestrator) = setup();

        let languages = orchestrator.languages().await.unwrap();
        assert!(languages.iter().any(|l| l.id == 71));

        let statuses = orchestrator.statuses().await.unwrap();
        assert_eq!(statuses.len(), 14);
        assert_eq!(statuses[2].description, "Accepted");
    }
}
