//! `silence add` command implementation.
//!
//! Everything that can fail locally (config policy, matcher syntax, expiry) is
//! checked before the first request. Submissions then run one at a time; a
//! server-side rejection is reported and the loop continues, while a transport
//! or decode failure ends the command.

use std::io::Write;

use am_silences::{
    EffectiveConfig, MatcherGroup, SilenceApi, SilenceError, SkippedDuplicate, SubmitOutcome,
    build_silences, filter_duplicates, parse_matcher_groups, resolve_expiry,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CliError;
use crate::output::{OutputFormat, PlainDisplay};

/// `silence add` executor.
pub struct SilenceAddCommand<'a, A: SilenceApi> {
    api: &'a A,
    config: &'a EffectiveConfig,
}

impl<'a, A: SilenceApi> SilenceAddCommand<'a, A> {
    /// Create a new command bound to a silence API and the resolved configuration.
    #[must_use]
    pub const fn new(api: &'a A, config: &'a EffectiveConfig) -> Self {
        Self { api, config }
    }

    /// Execute the command.
    ///
    /// One line per submitted silence is written to `writer`. Skipped duplicates
    /// are reported on `diagnostics` when verbose.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, every candidate is a duplicate, a
    /// request fails, or output cannot be written.
    pub async fn execute<W: Write, D: Write>(
        &self,
        writer: &mut W,
        diagnostics: &mut D,
        format: &OutputFormat,
        matchers: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), CliError> {
        self.config.validate()?;
        let groups = parse_matcher_groups(matchers)?;
        let window = resolve_expiry(self.config.expire_on.as_deref(), &self.config.expires, now)?;
        if groups.is_empty() {
            return Err(SilenceError::NoMatchersSpecified.into());
        }
        debug!(candidates = groups.len(), "Parsed matcher groups");

        let existing = self.api.list_silences().await?;
        let filtered = filter_duplicates(groups, &existing, now)?;
        if self.config.verbose {
            for skipped in filtered.skipped() {
                report_skipped(diagnostics, skipped)?;
            }
        }

        let silences = build_silences(filtered.into_fresh()?, self.config, window);
        for silence in silences {
            let outcome = self.api.create_silence(&silence).await?;
            info!(matchers = %silence.matchers, outcome = %outcome, "Silence submitted");

            let report = SubmissionReport {
                matchers: silence.matchers,
                outcome,
            };
            format.write(writer, &report)?;
        }

        Ok(())
    }
}

fn report_skipped<D: Write>(
    diagnostics: &mut D,
    skipped: &SkippedDuplicate,
) -> Result<(), CliError> {
    match &skipped.silence_id {
        Some(id) => writeln!(diagnostics, "Skipped adding duplicate silence, {id} matches")?,
        None => writeln!(
            diagnostics,
            "Skipped adding duplicate silence, {} matches",
            skipped.group
        )?,
    }
    Ok(())
}

/// Result of submitting one matcher group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    /// The group that was submitted.
    pub matchers: MatcherGroup,
    /// How the server answered.
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
}

impl PlainDisplay for SubmissionReport {
    fn write_simple<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}", self.outcome)?;
        Ok(())
    }

    fn write_extended<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}\t{}", self.outcome, self.matchers)?;
        Ok(())
    }
}

/// Fake silence API for testing.
#[cfg(test)]
pub struct FakeSilenceApi {
    existing: Vec<am_silences::Silence>,
    replies: std::sync::Mutex<std::collections::VecDeque<am_silences::Result<SubmitOutcome>>>,
    created: std::sync::Mutex<Vec<am_silences::Silence>>,
    list_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl FakeSilenceApi {
    /// Create a fake holding `existing` silences and answering creates with `replies`, in order.
    pub fn new(
        existing: Vec<am_silences::Silence>,
        replies: Vec<am_silences::Result<SubmitOutcome>>,
    ) -> Self {
        Self {
            existing,
            replies: std::sync::Mutex::new(replies.into()),
            created: std::sync::Mutex::new(Vec::new()),
            list_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Silences received by `create_silence`, in order.
    pub fn created(&self) -> Vec<am_silences::Silence> {
        self.created.lock().expect("lock").clone()
    }

    /// Number of `list_silences` calls.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl SilenceApi for FakeSilenceApi {
    async fn list_silences(&self) -> am_silences::Result<Vec<am_silences::Silence>> {
        self.list_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.existing.clone())
    }

    async fn create_silence(
        &self,
        silence: &am_silences::Silence,
    ) -> am_silences::Result<SubmitOutcome> {
        self.created.lock().expect("lock").push(silence.clone());
        self.replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| {
                Ok(SubmitOutcome::Created {
                    silence_id: "generated".to_string(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use am_silences::{Matcher, Silence, SilenceWindow};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid date")
    }

    fn config() -> EffectiveConfig {
        EffectiveConfig {
            author: "alice".to_string(),
            comment: "test".to_string(),
            expires: "1h".to_string(),
            expire_on: None,
            comment_required: false,
            verbose: false,
            alertmanager_url: "http://localhost:9093".parse().expect("valid url"),
        }
    }

    fn args(matchers: &[&str]) -> Vec<String> {
        matchers.iter().map(ToString::to_string).collect()
    }

    fn active_silence(id: &str, alertname: &str) -> Silence {
        let window = SilenceWindow::new(now() - Duration::hours(1), now() + Duration::hours(1))
            .expect("valid window");
        let mut silence = Silence::new(
            MatcherGroup::new().with(Matcher::equal("alertname", alertname)),
            window,
            "bob",
            "",
        );
        silence.id = Some(id.to_string());
        silence
    }

    async fn run(
        api: &FakeSilenceApi,
        config: &EffectiveConfig,
        format: Format,
        matchers: &[&str],
    ) -> (Result<(), CliError>, String, String) {
        let cmd = SilenceAddCommand::new(api, config);
        let mut out = Vec::new();
        let mut diag = Vec::new();
        let result = cmd
            .execute(&mut out, &mut diag, &OutputFormat::new(format), &args(matchers), now())
            .await;
        (
            result,
            String::from_utf8(out).expect("valid utf8"),
            String::from_utf8(diag).expect("valid utf8"),
        )
    }

    #[tokio::test]
    async fn accepted_and_rejected_groups_are_both_reported() {
        let api = FakeSilenceApi::new(
            Vec::new(),
            vec![
                Ok(SubmitOutcome::Created {
                    silence_id: "abc123".to_string(),
                }),
                Ok(SubmitOutcome::Rejected {
                    error_type: "bad_data".to_string(),
                    message: "invalid matcher".to_string(),
                }),
            ],
        );

        let (result, out, _) =
            run(&api, &config(), Format::Simple, &["alertname=foo", "node={bar,baz}"]).await;

        result.expect("rejection is not a process error");
        assert_eq!(out, "abc123\n[bad_data] invalid matcher\n");
        assert_eq!(api.created().len(), 2);
    }

    #[tokio::test]
    async fn submitted_silence_carries_config_and_window() {
        let api = FakeSilenceApi::new(Vec::new(), Vec::new());
        let mut config = config();
        config.expires = "2h".to_string();

        let (result, _, _) = run(&api, &config, Format::Simple, &["foo"]).await;

        result.expect("should succeed");
        let created = api.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].created_by, "alice");
        assert_eq!(created[0].comment, "test");
        assert_eq!(created[0].starts_at, now());
        assert_eq!(created[0].ends_at, now() + Duration::hours(2));
        assert_eq!(
            created[0].matchers,
            MatcherGroup::new().with(Matcher::equal("alertname", "foo"))
        );
    }

    #[tokio::test]
    async fn expire_on_overrides_expires() {
        let api = FakeSilenceApi::new(Vec::new(), Vec::new());
        let mut config = config();
        config.expire_on = Some("2030-01-01T00:00:00Z".to_string());

        let (result, _, _) = run(&api, &config, Format::Simple, &["foo"]).await;

        result.expect("should succeed");
        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).single().expect("valid date");
        assert_eq!(api.created()[0].ends_at, expected);
    }

    #[tokio::test]
    async fn all_duplicates_issue_no_creates() {
        let api = FakeSilenceApi::new(vec![active_silence("s-1", "foo")], Vec::new());

        let (result, out, _) = run(&api, &config(), Format::Simple, &["foo"]).await;

        assert!(matches!(
            result,
            Err(CliError::Silence(SilenceError::NoNewSilences))
        ));
        assert!(out.is_empty());
        assert!(api.created().is_empty());
    }

    #[tokio::test]
    async fn verbose_reports_skipped_duplicates() {
        let api = FakeSilenceApi::new(vec![active_silence("s-1", "foo")], Vec::new());
        let mut config = config();
        config.verbose = true;

        let (result, out, diag) =
            run(&api, &config, Format::Simple, &["alertname={foo,bar}"]).await;

        result.expect("should succeed");
        assert_eq!(diag, "Skipped adding duplicate silence, s-1 matches\n");
        assert_eq!(out, "generated\n");
        assert_eq!(api.created().len(), 1);
    }

    #[tokio::test]
    async fn quiet_mode_hides_skipped_duplicates() {
        let api = FakeSilenceApi::new(vec![active_silence("s-1", "foo")], Vec::new());

        let (result, _, diag) =
            run(&api, &config(), Format::Simple, &["alertname={foo,bar}"]).await;

        result.expect("should succeed");
        assert!(diag.is_empty());
    }

    #[tokio::test]
    async fn missing_required_comment_fails_before_any_request() {
        let api = FakeSilenceApi::new(Vec::new(), Vec::new());
        let mut config = config();
        config.comment_required = true;
        config.comment = String::new();

        let (result, _, _) = run(&api, &config, Format::Simple, &["foo"]).await;

        assert!(matches!(
            result,
            Err(CliError::Silence(SilenceError::ConfigValidation { .. }))
        ));
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn no_matchers_fails_before_any_request() {
        let api = FakeSilenceApi::new(Vec::new(), Vec::new());

        let (result, _, _) = run(&api, &config(), Format::Simple, &[]).await;

        assert!(matches!(
            result,
            Err(CliError::Silence(SilenceError::NoMatchersSpecified))
        ));
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn invalid_duration_fails_before_any_request() {
        let api = FakeSilenceApi::new(Vec::new(), Vec::new());
        let mut config = config();
        config.expires = "soon".to_string();

        let (result, _, _) = run(&api, &config, Format::Simple, &["foo"]).await;

        assert!(matches!(
            result,
            Err(CliError::Silence(SilenceError::InvalidDuration { .. }))
        ));
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn submission_failure_aborts_remaining_groups() {
        let api = FakeSilenceApi::new(
            Vec::new(),
            vec![
                Err(SilenceError::SubmissionFailed {
                    url: "http://localhost:9093/api/v1/silences".to_string(),
                    reason: "connection reset".to_string(),
                }),
                Ok(SubmitOutcome::Created {
                    silence_id: "never".to_string(),
                }),
            ],
        );

        let (result, out, _) = run(&api, &config(), Format::Simple, &["alertname={a,b}"]).await;

        assert!(matches!(
            result,
            Err(CliError::Silence(SilenceError::SubmissionFailed { .. }))
        ));
        assert!(out.is_empty());
        assert_eq!(api.created().len(), 1);
    }

    #[tokio::test]
    async fn success_without_id_prints_empty_line_and_continues() {
        let api = FakeSilenceApi::new(
            Vec::new(),
            vec![
                Ok(SubmitOutcome::Created {
                    silence_id: String::new(),
                }),
                Ok(SubmitOutcome::Created {
                    silence_id: "abc123".to_string(),
                }),
            ],
        );

        let (result, out, _) = run(&api, &config(), Format::Simple, &["alertname={a,b}"]).await;

        result.expect("missing id is not a process error");
        assert_eq!(out, "\nabc123\n");
        assert_eq!(api.created().len(), 2);
    }

    #[tokio::test]
    async fn extended_output_includes_matchers() {
        let api = FakeSilenceApi::new(
            Vec::new(),
            vec![Ok(SubmitOutcome::Created {
                silence_id: "abc123".to_string(),
            })],
        );

        let (result, out, _) =
            run(&api, &config(), Format::Extended, &["foo", "node=~web.*"]).await;

        result.expect("should succeed");
        assert_eq!(out, "abc123\t{alertname=\"foo\", node=~\"web.*\"}\n");
    }

    #[tokio::test]
    async fn json_output_has_status_and_matchers() {
        let api = FakeSilenceApi::new(
            Vec::new(),
            vec![Ok(SubmitOutcome::Created {
                silence_id: "abc123".to_string(),
            })],
        );

        let (result, out, _) = run(&api, &config(), Format::Json, &["foo"]).await;

        result.expect("should succeed");
        let value: serde_json::Value = serde_json::from_str(out.trim()).expect("valid json");
        assert_eq!(value["status"], "success");
        assert_eq!(value["silence_id"], "abc123");
        assert_eq!(value["matchers"][0]["name"], "alertname");
    }
}
