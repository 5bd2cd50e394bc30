//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Worker/Task graph checks raised before any orchestrator call
//! - Template substitution over every bundled scenario
//! - Scenario runs against the mock orchestrator
//! - Output contracts, output files and credential preflight

#[cfg(test)]
mod graph_tests {
    use contracts::{CrewBlueprint, ErrorKind, RunParameters, TaskSpec, WorkerSpec};
    use crew_factory::{CrewFactory, MockOrchestrator};

    fn workers() -> Vec<WorkerSpec> {
        vec![
            WorkerSpec::new("planner", "Content Planner", "Plan", "You plan."),
            WorkerSpec::new("writer", "Content Writer", "Write", "You write."),
        ]
    }

    async fn kickoff_fails_before_orchestrator(blueprint: CrewBlueprint) -> String {
        let factory = CrewFactory::new(MockOrchestrator::new());
        let err = contracts::ContractError::from(
            factory
                .kickoff(&blueprint, &RunParameters::new())
                .await
                .unwrap_err(),
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(factory.orchestrator().kickoff_count(), 0);
        err.to_string()
    }

    #[tokio::test]
    async fn test_forward_dependency_rejected() {
        let bp = CrewBlueprint::new(
            "forward",
            workers(),
            vec![
                TaskSpec::new("write", "writer", "Write", "A post").depends_on(["plan"]),
                TaskSpec::new("plan", "planner", "Plan", "An outline"),
            ],
        );
        let message = kickoff_fails_before_orchestrator(bp).await;
        assert!(message.contains("write"), "{message}");
        assert!(message.contains("plan"), "{message}");
    }

    #[tokio::test]
    async fn test_cycle_rejected() {
        let bp = CrewBlueprint::new(
            "cycle",
            workers(),
            vec![
                TaskSpec::new("plan", "planner", "Plan", "An outline").depends_on(["write"]),
                TaskSpec::new("write", "writer", "Write", "A post").depends_on(["plan"]),
            ],
        );
        kickoff_fails_before_orchestrator(bp).await;
    }

    #[tokio::test]
    async fn test_self_dependency_rejected() {
        let bp = CrewBlueprint::new(
            "self",
            workers(),
            vec![TaskSpec::new("plan", "planner", "Plan", "An outline").depends_on(["plan"])],
        );
        let message = kickoff_fails_before_orchestrator(bp).await;
        assert!(message.contains("itself"), "{message}");
    }

    #[tokio::test]
    async fn test_unknown_worker_rejected() {
        let bp = CrewBlueprint::new(
            "unknown-worker",
            workers(),
            vec![TaskSpec::new("edit", "editor", "Edit", "A post")],
        );
        let message = kickoff_fails_before_orchestrator(bp).await;
        assert!(message.contains("editor"), "{message}");
    }
}

#[cfg(test)]
mod template_tests {
    use config_loader::template;
    use contracts::{CrewBlueprint, ErrorKind, ParameterSpec, RunParameters, TaskSpec, WorkerSpec};
    use crew_factory::{CrewFactory, MockOrchestrator};
    use scenarios::Scenario;

    #[test]
    fn test_rendering_is_total_for_every_scenario() {
        let factory = CrewFactory::new(MockOrchestrator::new());
        for scenario in Scenario::all() {
            let crew = factory
                .assemble(&scenario.blueprint().unwrap(), &RunParameters::new())
                .unwrap();

            let texts = crew
                .workers
                .iter()
                .flat_map(|w| [&w.goal, &w.backstory])
                .chain(crew.tasks.iter().flat_map(|t| [&t.description, &t.expected_output]));
            for text in texts {
                assert!(
                    template::placeholders(text).is_empty(),
                    "{scenario}: unresolved placeholder in {text:?}"
                );
            }
        }
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let params = RunParameters::new().with("topic", "Rust");
        let once = template::render("Write about {topic}.", &params, "t").unwrap();
        let twice = template::render(&once, &params, "t").unwrap();
        assert_eq!(once, "Write about Rust.");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let factory = CrewFactory::new(MockOrchestrator::new());
        let crew = factory
            .assemble(
                &Scenario::CustomerSupport.blueprint().unwrap(),
                &RunParameters::new().with("customer", "Ferris Inc"),
            )
            .unwrap();
        let task = crew.task("inquiry_resolution").unwrap();
        assert!(task.description.starts_with("Ferris Inc just reached out"));
        assert!(task.description.contains("Andrew Ng from Ferris Inc"));
    }

    #[tokio::test]
    async fn test_missing_required_parameter() {
        let bp = CrewBlueprint::new(
            "needs-topic",
            vec![WorkerSpec::new("writer", "Writer", "Write on {topic}", "You write.")],
            vec![TaskSpec::new("write", "writer", "Write about {topic}", "A post")],
        )
        .with_parameters(vec![ParameterSpec::required("topic")]);

        let factory = CrewFactory::new(MockOrchestrator::new());
        let err = contracts::ContractError::from(
            factory.kickoff(&bp, &RunParameters::new()).await.unwrap_err(),
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("topic"));
        assert_eq!(factory.orchestrator().kickoff_count(), 0);
    }

    #[test]
    fn test_undeclared_placeholder_rejected() {
        let workers = vec![WorkerSpec::new("writer", "Writer", "Write", "You write.")];
        let tasks = vec![TaskSpec::new("write", "writer", "Write for {audience}", "A post")];
        let bp = CrewBlueprint::new("undeclared", workers, tasks);

        let err = config_loader::ConfigLoader::validate(&bp).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("audience"));
    }
}

#[cfg(test)]
mod scenario_tests {
    use contracts::ErrorKind;
    use crew_factory::{CrewFactory, MockOrchestrator, ScriptedReviewer};
    use contracts::{ReviewDecision, RunParameters};
    use scenarios::{article, event_planning, Scenario};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_article_pipeline() {
        let workers = article::build_workers();
        let tasks = article::build_tasks(&workers).unwrap();
        assert_eq!(workers.len(), 4);
        assert_eq!(tasks.len(), 4);

        let edit = tasks.last().unwrap();
        assert!(edit.context.contains(&"write".to_string()));
        let write = tasks.iter().find(|t| t.id == "write").unwrap();
        assert!(write.context.contains(&"plan".to_string()));

        let mock = MockOrchestrator::new();
        let result = scenarios::run_article(&mock, [("topic", "Artificial Intelligence")])
            .await
            .unwrap();

        assert_eq!(mock.kickoff_count(), 1);
        assert_eq!(result.final_task_id, "edit");
        assert!(!result.final_output.trim().is_empty());
        assert!(result.final_output.contains("[Editor]"));
        assert!(result.final_output.contains("Built on 'write'"));

        let order: Vec<_> = mock.executed().into_iter().map(|r| r.task_id).collect();
        assert_eq!(order, vec!["research", "plan", "write", "edit"]);
    }

    #[tokio::test]
    async fn test_event_planning_honors_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let factory = CrewFactory::new(MockOrchestrator::new()).with_output_dir(dir.path());
        let result = Scenario::EventPlanning
            .run_with(&factory, &RunParameters::new())
            .await
            .unwrap();

        let executed = factory.orchestrator().executed();
        let stage = |id: &str| executed.iter().find(|r| r.task_id == id).unwrap().stage;
        assert_eq!(stage("venue"), 0);
        assert_eq!(stage("logistics"), 0);
        assert!(stage("marketing") > stage("venue"));

        let venue_pos = executed.iter().position(|r| r.task_id == "venue").unwrap();
        let marketing_pos = executed.iter().position(|r| r.task_id == "marketing").unwrap();
        assert!(venue_pos < marketing_pos);

        let venue = result.output_of("venue").unwrap();
        let record = venue.structured.as_ref().unwrap();
        assert!(record["capacity"].is_i64());

        let report = std::fs::read_to_string(dir.path().join(event_planning::MARKETING_FILE)).unwrap();
        assert_eq!(report, result.final_output);
        let details = std::fs::read_to_string(dir.path().join(event_planning::VENUE_FILE)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&details).unwrap();
        assert_eq!(&parsed, record);
    }

    #[tokio::test]
    async fn test_human_feedback_revises_text_task() {
        let dir = tempfile::tempdir().unwrap();
        let reviewer = Arc::new(ScriptedReviewer::new(vec![
            ReviewDecision::Approve,
            ReviewDecision::Revise {
                feedback: "add vegetarian catering".into(),
            },
        ]));
        let mock = MockOrchestrator::new().with_reviewer(reviewer.clone());
        let factory = CrewFactory::new(mock).with_output_dir(dir.path());

        let result = Scenario::EventPlanning
            .run_with(&factory, &RunParameters::new())
            .await
            .unwrap();

        let logistics = result.output_of("logistics").unwrap();
        assert!(logistics.raw.contains("Revised per feedback: add vegetarian catering"));
        assert_eq!(reviewer.reviewed(), vec!["venue", "logistics"]);
    }

    #[tokio::test]
    async fn test_outreach_runs_custom_tool() {
        let mock = MockOrchestrator::new();
        let result = scenarios::run_customer_outreach(&mock, [("lead_name", "Ferris Labs")])
            .await
            .unwrap();
        assert!(result.final_output.contains("Tool sentiment_analysis:"));
        assert!(result.final_output.contains("Ferris Labs"));
    }

    #[tokio::test]
    async fn test_unknown_keyword_override() {
        let mock = MockOrchestrator::new();
        let err = scenarios::run_event_planning(&mock, [("event_town", "Berlin")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("event_town"));
        assert_eq!(mock.kickoff_count(), 0);
    }
}

#[cfg(test)]
mod output_contract_tests {
    use std::collections::HashMap;

    use contracts::{
        CrewBlueprint, ErrorKind, FieldKind, FieldSpec, OutputSchema, RunParameters, TaskSpec,
        WorkerSpec,
    };
    use crew_factory::{CrewFactory, MockConfig, MockOrchestrator};
    use scenarios::Scenario;

    fn venue_blueprint() -> CrewBlueprint {
        CrewBlueprint::new(
            "venue-only",
            vec![WorkerSpec::new("coordinator", "Venue Coordinator", "Book", "You book.")],
            vec![TaskSpec::new("venue", "coordinator", "Find a venue", "Venue details")
                .structured(OutputSchema::new(
                    "VenueDetails",
                    vec![
                        FieldSpec::new("name", FieldKind::String),
                        FieldSpec::new("address", FieldKind::String),
                        FieldSpec::new("capacity", FieldKind::Integer),
                    ],
                ))],
        )
    }

    fn canned(raw: &str) -> MockOrchestrator {
        MockOrchestrator::with_config(MockConfig {
            canned_outputs: HashMap::from([("venue".to_string(), raw.to_string())]),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_missing_field_is_contract_violation() {
        let factory = CrewFactory::new(canned(r#"{"name": "Moscone", "address": "747 Howard St"}"#));
        let err = contracts::ContractError::from(
            factory
                .kickoff(&venue_blueprint(), &RunParameters::new())
                .await
                .unwrap_err(),
        );
        assert_eq!(err.kind(), ErrorKind::OutputContract);
        assert!(err.to_string().contains("capacity"));
    }

    #[tokio::test]
    async fn test_wrong_type_is_contract_violation() {
        let factory = CrewFactory::new(canned(
            r#"{"name": "Moscone", "address": "747 Howard St", "capacity": "large"}"#,
        ));
        let err = contracts::ContractError::from(
            factory
                .kickoff(&venue_blueprint(), &RunParameters::new())
                .await
                .unwrap_err(),
        );
        assert_eq!(err.kind(), ErrorKind::OutputContract);
    }

    #[tokio::test]
    async fn test_fenced_json_accepted() {
        let factory = CrewFactory::new(canned(
            "```json\n{\"name\": \"Moscone\", \"address\": \"747 Howard St\", \"capacity\": 2000}\n```",
        ));
        let result = factory
            .kickoff(&venue_blueprint(), &RunParameters::new())
            .await
            .unwrap();
        assert_eq!(result.structured.unwrap()["capacity"], 2000);
    }

    #[tokio::test]
    async fn test_missing_output_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockOrchestrator::with_config(MockConfig {
            skip_output_files: true,
            ..Default::default()
        });
        let factory = CrewFactory::new(mock).with_output_dir(dir.path());
        let err = Scenario::EventPlanning
            .run_with(&factory, &RunParameters::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExternalExecution);
        assert!(err.to_string().contains("venue_details.json"));
    }
}

#[cfg(test)]
mod credential_tests {
    use config_loader::CredentialsLoader;
    use contracts::{Credentials, ErrorKind, RunParameters, INFERENCE_API_KEY_ENV, SEARCH_API_KEY_ENV};
    use crew_factory::{CrewFactory, MockConfig, MockOrchestrator};
    use scenarios::Scenario;

    fn strict_mock(credentials: Credentials) -> MockOrchestrator {
        MockOrchestrator::with_config(MockConfig {
            require_credentials: Some(credentials),
            ..Default::default()
        })
    }

    async fn run(scenario: Scenario, credentials: Credentials) -> Result<(), contracts::ContractError> {
        let dir = tempfile::tempdir().unwrap();
        let factory = CrewFactory::new(strict_mock(credentials)).with_output_dir(dir.path());
        let outcome = scenario.run_with(&factory, &RunParameters::new()).await;
        if outcome.is_err() {
            assert_eq!(factory.orchestrator().kickoff_count(), 0);
        }
        outcome.map(|_| ())
    }

    #[tokio::test]
    async fn test_missing_inference_key() {
        let err = run(Scenario::Article, Credentials::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains(INFERENCE_API_KEY_ENV));
    }

    #[tokio::test]
    async fn test_search_key_only_needed_with_search() {
        let credentials = CredentialsLoader::from_lookup(|name| {
            (name == INFERENCE_API_KEY_ENV).then(|| "sk-test".to_string())
        });

        run(Scenario::Article, credentials.clone()).await.unwrap();

        let err = run(Scenario::CustomerOutreach, credentials).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains(SEARCH_API_KEY_ENV));
    }

    #[tokio::test]
    async fn test_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(
            &env_file,
            format!("{INFERENCE_API_KEY_ENV}=sk-file\n{SEARCH_API_KEY_ENV}=serper-file\n"),
        )
        .unwrap();

        let credentials = CredentialsLoader::load(&env_file).unwrap();
        assert!(credentials.inference_api_key.is_some());
        assert!(credentials.search_api_key.is_some());
        run(Scenario::EventPlanning, credentials).await.unwrap();
    }
}

#[cfg(test)]
mod config_file_tests {
    use config_loader::ConfigLoader;
    use contracts::RunParameters;
    use crew_factory::{CrewFactory, MockOrchestrator};
    use observability::CrewRunStats;
    use scenarios::Scenario;

    #[tokio::test]
    async fn test_exported_scenario_runs_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_planning.toml");
        let toml = ConfigLoader::to_toml(&Scenario::EventPlanning.blueprint().unwrap()).unwrap();
        std::fs::write(&path, toml).unwrap();

        let blueprint = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(
            ConfigLoader::to_json(&blueprint).unwrap(),
            ConfigLoader::to_json(&Scenario::EventPlanning.blueprint().unwrap()).unwrap()
        );

        let factory = CrewFactory::new(MockOrchestrator::new()).with_output_dir(dir.path());
        let result = factory
            .kickoff(&blueprint, &RunParameters::new().with("event_city", "Lisbon"))
            .await
            .unwrap();

        let venue = result.output_of("venue").unwrap();
        assert!(venue.raw.contains("venue"));
        assert_eq!(result.files.len(), 2);

        let mut stats = CrewRunStats::new();
        stats.record_success(&result);
        let summary = stats.summary();
        assert_eq!(summary.tasks_completed, 3);
        assert_eq!(summary.files_written, 2);
    }

    #[test]
    fn test_sample_config_is_valid() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../crews/article.toml");
        let blueprint = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(blueprint.name, "article");
        assert!(blueprint.parameter("topic").is_some());
    }
}
