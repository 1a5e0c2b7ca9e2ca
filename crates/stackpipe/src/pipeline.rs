use std::path::{Path, PathBuf};

use stackpipe_core::dates::transform_records;
use stackpipe_core::error::PipelineError;
use stackpipe_core::report::{Reporter, Stage};
use stackpipe_core::resource::ResourceType;

use crate::fetch::Fetcher;
use crate::writer::write_resource;

/// Final state of one resource type
#[derive(Debug)]
pub struct ResourceOutcome {
    pub resource: ResourceType,
    pub stage: Stage,
    pub records: usize,
    pub transform_errors: usize,
    pub path: Option<PathBuf>,
    pub error: Option<PipelineError>,
}

/// Outcomes of a run, in processing order
#[derive(Debug, Default)]
pub struct Summary {
    pub outcomes: Vec<ResourceOutcome>,
}

impl Summary {
    pub fn failed(&self) -> Vec<ResourceType> {
        self.outcomes
            .iter()
            .filter(|o| o.stage == Stage::Failed)
            .map(|o| o.resource)
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed().is_empty()
    }
}

/// Moves one resource type through its stages and reports each transition
struct Progress<'a> {
    resource: ResourceType,
    stage: Stage,
    reporter: &'a dyn Reporter,
}

impl<'a> Progress<'a> {
    fn new(resource: ResourceType, reporter: &'a dyn Reporter) -> Self {
        reporter.stage(resource, Stage::Pending);
        Self {
            resource,
            stage: Stage::Pending,
            reporter,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            !self.stage.is_terminal(),
            "{} already finished as {}",
            self.resource,
            self.stage
        );
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        self.stage = next;
        self.reporter.stage(self.resource, next);
    }

    fn fail(mut self, error: PipelineError, records: usize) -> ResourceOutcome {
        self.reporter.failed(self.resource, &error);
        self.advance(Stage::Failed);
        ResourceOutcome {
            resource: self.resource,
            stage: self.stage,
            records,
            transform_errors: 0,
            path: None,
            error: Some(error),
        }
    }
}

/// Fetch, transform and write a single resource type
///
/// Never returns an error: failures are captured in the outcome so the
/// caller can carry on with the next resource type.
pub async fn run_resource(
    fetcher: &Fetcher,
    output_dir: &Path,
    resource: ResourceType,
    reporter: &dyn Reporter,
) -> ResourceOutcome {
    let mut progress = Progress::new(resource, reporter);

    progress.advance(Stage::Fetching);
    let records = match fetcher.fetch_all(resource, reporter).await {
        Ok(records) => records,
        Err(err) => return progress.fail(err.into(), 0),
    };

    progress.advance(Stage::Transforming);
    let (records, transform_errors) = transform_records(records);
    for error in &transform_errors {
        reporter.transform_error(resource, error);
    }

    progress.advance(Stage::Writing);
    let (path, rows) = match write_resource(output_dir, resource, &records) {
        Ok(written) => written,
        Err(err) => return progress.fail(err.into(), records.len()),
    };
    reporter.written(resource, &path, rows);

    progress.advance(Stage::Done);
    ResourceOutcome {
        resource,
        stage: progress.stage,
        records: rows,
        transform_errors: transform_errors.len(),
        path: Some(path),
        error: None,
    }
}

/// Run every resource type in order, one after the other
pub async fn run_all(
    fetcher: &Fetcher,
    output_dir: &Path,
    resources: &[ResourceType],
    reporter: &dyn Reporter,
) -> Summary {
    let mut summary = Summary::default();
    for resource in resources {
        let outcome = run_resource(fetcher, output_dir, *resource, reporter).await;
        summary.outcomes.push(outcome);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::{mount_page, options, page_body};
    use serde_json::json;
    use stackpipe_core::report::{Event, MemoryReporter};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_single_page(server: &MockServer, resource: ResourceType, ids: &[i64]) {
        mount_page(server, &resource.endpoint(), 1, page_body(ids, false)).await;
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already finished")]
    fn test_progress_rejects_transition_after_done() {
        let reporter = MemoryReporter::new();
        let mut progress = Progress::new(ResourceType::Tags, &reporter);
        for stage in [
            Stage::Fetching,
            Stage::Transforming,
            Stage::Writing,
            Stage::Done,
        ] {
            progress.advance(stage);
        }

        progress.advance(Stage::Failed);
    }

    #[tokio::test]
    async fn test_run_all_writes_five_files() {
        let server = MockServer::start().await;
        for resource in ResourceType::ALL {
            mount_single_page(&server, resource, &[1, 2]).await;
        }
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("out");

        let options = options(&server.uri(), &output_dir);
        let fetcher = Fetcher::new(&options).unwrap();
        let reporter = MemoryReporter::new();
        let summary = run_all(
            &fetcher,
            &options.output_dir,
            &options.selected_resources(),
            &reporter,
        )
        .await;

        assert!(summary.is_success());
        let mut files: Vec<String> = std::fs::read_dir(&output_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(
            files,
            vec![
                "stackoverflow_comments.csv",
                "stackoverflow_posts.csv",
                "stackoverflow_questions.csv",
                "stackoverflow_tags.csv",
                "stackoverflow_users.csv",
            ]
        );

        for resource in ResourceType::ALL {
            let content = std::fs::read_to_string(output_dir.join(resource.file_name())).unwrap();
            let mut lines = content.lines();
            assert_eq!(lines.next(), Some("id,creation_date"));
            assert_eq!(lines.next(), Some("1,02-01-2021"));
            assert_eq!(lines.next(), Some("2,03-01-2021"));
            assert_eq!(lines.next(), None);

            assert_eq!(
                reporter.stages(resource),
                vec![
                    Stage::Pending,
                    Stage::Fetching,
                    Stage::Transforming,
                    Stage::Writing,
                    Stage::Done
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_only_fails_that_resource() {
        let server = MockServer::start().await;
        for resource in ResourceType::ALL {
            if resource != ResourceType::Posts {
                mount_single_page(&server, resource, &[1]).await;
            }
        }
        mount_page(&server, "/posts", 1, page_body(&[1, 2], true)).await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let options = options(&server.uri(), temp_dir.path());
        let fetcher = Fetcher::new(&options).unwrap();
        let reporter = MemoryReporter::new();
        let summary = run_all(&fetcher, temp_dir.path(), &ResourceType::ALL, &reporter).await;

        assert!(!summary.is_success());
        assert_eq!(summary.failed(), vec![ResourceType::Posts]);
        assert_eq!(summary.outcomes.len(), 5);

        let posts = &summary.outcomes[1];
        assert_eq!(posts.stage, Stage::Failed);
        assert!(posts.path.is_none());
        assert_eq!(
            posts.error.as_ref().unwrap().to_string(),
            "Failed to fetch posts page 2: HTTP 503 Service Unavailable"
        );
        assert!(!temp_dir.path().join("stackoverflow_posts.csv").exists());
        assert!(temp_dir.path().join("stackoverflow_users.csv").exists());
        assert_eq!(
            reporter.stages(ResourceType::Posts),
            vec![Stage::Pending, Stage::Fetching, Stage::Failed]
        );
    }

    #[tokio::test]
    async fn test_zero_records_writes_header_only_file() {
        let server = MockServer::start().await;
        mount_single_page(&server, ResourceType::Tags, &[]).await;
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(&options(&server.uri(), temp_dir.path())).unwrap();
        let reporter = MemoryReporter::new();

        let outcome = run_resource(&fetcher, temp_dir.path(), ResourceType::Tags, &reporter).await;

        assert_eq!(outcome.stage, Stage::Done);
        assert_eq!(outcome.records, 0);
        let content = std::fs::read_to_string(outcome.path.unwrap()).unwrap();
        assert_eq!(
            content,
            "has_synonyms,is_moderator_only,is_required,count,name\r\n"
        );
    }

    #[tokio::test]
    async fn test_malformed_dates_are_reported_and_kept() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/users",
            1,
            json!({
                "items": [
                    {"user_id": 1, "creation_date": 1609459200, "last_access_date": "never"},
                    {"user_id": 2, "creation_date": null, "display_name": "Jon, Skeet"}
                ],
                "has_more": false
            }),
        )
        .await;
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(&options(&server.uri(), temp_dir.path())).unwrap();
        let reporter = MemoryReporter::new();

        let outcome = run_resource(&fetcher, temp_dir.path(), ResourceType::Users, &reporter).await;

        assert_eq!(outcome.stage, Stage::Done);
        assert_eq!(outcome.transform_errors, 2);
        let transform_errors: Vec<Event> = reporter
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::TransformError(..)))
            .collect();
        assert_eq!(
            transform_errors,
            vec![
                Event::TransformError(ResourceType::Users, "last_access_date".to_string()),
                Event::TransformError(ResourceType::Users, "creation_date".to_string()),
            ]
        );

        let content = std::fs::read_to_string(outcome.path.unwrap()).unwrap();
        assert_eq!(
            content,
            "user_id,creation_date,last_access_date,display_name\r\n\
             1,01-01-2021,never,\r\n\
             2,,,\"Jon, Skeet\"\r\n"
        );
    }

    #[tokio::test]
    async fn test_write_failure_marks_resource_failed() {
        let server = MockServer::start().await;
        mount_single_page(&server, ResourceType::Comments, &[1]).await;
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("out");
        std::fs::write(&blocker, "").unwrap();
        let fetcher = Fetcher::new(&options(&server.uri(), &blocker)).unwrap();
        let reporter = MemoryReporter::new();

        let outcome = run_resource(&fetcher, &blocker, ResourceType::Comments, &reporter).await;

        assert_eq!(outcome.stage, Stage::Failed);
        assert_eq!(outcome.records, 1);
        assert!(matches!(outcome.error, Some(PipelineError::Write(_))));
        assert_eq!(
            reporter.stages(ResourceType::Comments),
            vec![
                Stage::Pending,
                Stage::Fetching,
                Stage::Transforming,
                Stage::Writing,
                Stage::Failed
            ]
        );
    }
}
