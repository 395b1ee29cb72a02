//! Sequential suite runner.
//!
//! A suite moves through `Init -> Reset -> Running(0..n) -> Done`. Every
//! case is dispatched and validated in declaration order; a mismatch is
//! recorded and the next case still runs, while any [`RunError`] stops the
//! suite where it is.

use std::time::Instant;

use tracing::{debug, info, warn};

use blackbox_domain::{CaseOutcome, SuiteReport, TestSuite};

use crate::error::{RunError, RunResult};
use crate::ports::{Dispatcher, Fixture};
use crate::validator::validate;

/// Position of a suite in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    /// Not started.
    Init,
    /// About to reset the fixture's state.
    Reset,
    /// About to run the case at this 0-based index.
    Running(usize),
    /// All cases ran.
    Done,
}

/// Drives one suite against a started fixture.
pub struct SuiteRunner<'a, D, F> {
    suite: &'a TestSuite,
    dispatcher: &'a D,
    fixture: &'a mut F,
    state: SuiteState,
    outcomes: Vec<CaseOutcome>,
    started: Instant,
}

impl<'a, D: Dispatcher, F: Fixture> SuiteRunner<'a, D, F> {
    /// Creates a runner in the `Init` state.
    ///
    /// The fixture must already be started and `dispatcher` pointed at it.
    pub fn new(suite: &'a TestSuite, dispatcher: &'a D, fixture: &'a mut F) -> Self {
        Self {
            suite,
            dispatcher,
            fixture,
            state: SuiteState::Init,
            outcomes: Vec::with_capacity(suite.len()),
            started: Instant::now(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SuiteState {
        self.state
    }

    /// Performs one transition and returns the new state.
    ///
    /// Calling `step` in `Done` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] on reset failure, transport failure or an
    /// unparseable body. The state is left unchanged in that case.
    pub async fn step(&mut self) -> RunResult<SuiteState> {
        self.state = match self.state {
            SuiteState::Init => {
                info!(suite = self.suite.name(), cases = self.suite.len(), "starting suite");
                self.started = Instant::now();
                SuiteState::Reset
            }
            SuiteState::Reset => {
                self.fixture
                    .reset()
                    .await
                    .map_err(|source| RunError::Reset {
                        suite: self.suite.name().to_string(),
                        source,
                    })?;
                debug!(suite = self.suite.name(), "fixture state reset");
                self.state_at(0)
            }
            SuiteState::Running(index) => {
                self.run_case(index).await?;
                self.state_at(index + 1)
            }
            SuiteState::Done => SuiteState::Done,
        };
        Ok(self.state)
    }

    /// Steps until `Done`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunError`] encountered. Outcomes recorded before
    /// the failure remain available through [`Self::finish`].
    pub async fn run_to_end(&mut self) -> RunResult<()> {
        while self.step().await? != SuiteState::Done {}
        Ok(())
    }

    /// Runs the whole suite and returns its report.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunError`] encountered.
    pub async fn run(mut self) -> RunResult<SuiteReport> {
        self.run_to_end().await?;
        Ok(self.finish())
    }

    /// Consumes the runner and reports the cases executed so far.
    #[must_use]
    pub fn finish(self) -> SuiteReport {
        let report = SuiteReport::new(self.suite.name(), self.outcomes, self.started.elapsed());
        info!(
            suite = %report.name,
            passed = report.passed(),
            failed = report.failed(),
            "suite finished"
        );
        report
    }

    fn state_at(&self, index: usize) -> SuiteState {
        if index < self.suite.cases().len() {
            SuiteState::Running(index)
        } else {
            SuiteState::Done
        }
    }

    async fn run_case(&mut self, index: usize) -> RunResult<()> {
        let case = &self.suite.cases()[index];
        let number = index + 1;
        let started = Instant::now();

        let response = self
            .dispatcher
            .send(case.method(), case.path(), case.request_body())
            .await
            .map_err(|source| RunError::Transport {
                suite: self.suite.name().to_string(),
                case: number,
                source,
            })?;

        let result = validate(&response, case).map_err(|source| RunError::Validation {
            suite: self.suite.name().to_string(),
            case: number,
            source,
        })?;

        match &result.diagnostic {
            Some(diagnostic) => warn!(
                suite = self.suite.name(),
                case = number,
                method = %case.method(),
                path = case.path(),
                "assertion failed: {diagnostic}"
            ),
            None => debug!(
                suite = self.suite.name(),
                case = number,
                method = %case.method(),
                path = case.path(),
                "passed"
            ),
        }

        self.outcomes
            .push(CaseOutcome::new(number, case, result, started.elapsed()));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ports::{FixtureError, FixtureHandle, TransportError};
    use async_trait::async_trait;
    use blackbox_domain::{ActualResponse, FatalKind, HttpMethod, TestCase};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records what was sent.
    struct ScriptedDispatcher {
        replies: Mutex<VecDeque<Result<ActualResponse, TransportError>>>,
        sent: Mutex<Vec<(HttpMethod, String, String)>>,
    }

    impl ScriptedDispatcher {
        fn new(replies: Vec<Result<ActualResponse, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent_paths(&self) -> Vec<String> {
            self.sent
                .lock()
                .expect("Lock poisoned")
                .iter()
                .map(|(_, path, _)| path.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Dispatcher for ScriptedDispatcher {
        async fn send(
            &self,
            method: HttpMethod,
            path: &str,
            body: &str,
        ) -> Result<ActualResponse, TransportError> {
            self.sent
                .lock()
                .expect("Lock poisoned")
                .push((method, path.to_string(), body.to_string()));
            self.replies
                .lock()
                .expect("Lock poisoned")
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    #[derive(Default)]
    struct CountingFixture {
        resets: usize,
        fail_reset: bool,
    }

    #[async_trait]
    impl Fixture for CountingFixture {
        async fn start(&mut self) -> Result<FixtureHandle, FixtureError> {
            Ok(FixtureHandle::new("http://127.0.0.1:9191", Default::default()))
        }

        async fn reset(&mut self) -> Result<(), FixtureError> {
            if self.fail_reset {
                return Err(FixtureError::Reset("datastore locked".to_string()));
            }
            self.resets += 1;
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), FixtureError> {
            Ok(())
        }
    }

    fn ok(status: u16, body: &str) -> Result<ActualResponse, TransportError> {
        Ok(ActualResponse::new(status, body.as_bytes().to_vec()))
    }

    fn three_case_suite() -> TestSuite {
        TestSuite::new(
            "settings",
            vec![
                TestCase::exact(HttpMethod::Post, "/first", "{}", 200, "{}"),
                TestCase::exact(HttpMethod::Get, "/second", "", 200, r#"{"a":1}"#),
                TestCase::exact(HttpMethod::Get, "/third", "", 200, "{}"),
            ],
        )
    }

    #[tokio::test]
    async fn walks_the_state_machine_in_order() {
        let suite = three_case_suite();
        let dispatcher =
            ScriptedDispatcher::new(vec![ok(200, "{}"), ok(200, r#"{"a":1}"#), ok(200, "{}")]);
        let mut fixture = CountingFixture::default();
        let mut runner = SuiteRunner::new(&suite, &dispatcher, &mut fixture);

        assert_eq!(runner.state(), SuiteState::Init);
        let mut states = Vec::new();
        loop {
            let state = runner.step().await.unwrap();
            states.push(state);
            if state == SuiteState::Done {
                break;
            }
        }
        assert_eq!(
            states,
            vec![
                SuiteState::Reset,
                SuiteState::Running(0),
                SuiteState::Running(1),
                SuiteState::Running(2),
                SuiteState::Done,
            ]
        );
        assert_eq!(runner.step().await.unwrap(), SuiteState::Done);

        let report = runner.finish();
        assert!(report.all_passed());
        assert_eq!(fixture.resets, 1);
        assert_eq!(dispatcher.sent_paths(), vec!["/first", "/second", "/third"]);
    }

    #[tokio::test]
    async fn soft_failures_do_not_stop_the_suite() {
        let suite = three_case_suite();
        let dispatcher = ScriptedDispatcher::new(vec![
            ok(500, r#"{"success":false}"#),
            ok(200, r#"{"a":2}"#),
            ok(200, "{}"),
        ]);
        let mut fixture = CountingFixture::default();

        let report = SuiteRunner::new(&suite, &dispatcher, &mut fixture)
            .run()
            .await
            .unwrap();

        let passed: Vec<_> = report.outcomes.iter().map(CaseOutcome::passed).collect();
        assert_eq!(passed, vec![false, false, true]);
        assert!(!report.outcomes[0].result.status_match);
        assert!(report.outcomes[1].result.status_match);
        assert!(!report.outcomes[1].result.body_match);
        assert_eq!(report.failures().map(|o| o.case).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn reset_failure_is_fatal_before_any_case() {
        let suite = three_case_suite();
        let dispatcher = ScriptedDispatcher::new(Vec::new());
        let mut fixture = CountingFixture {
            fail_reset: true,
            ..CountingFixture::default()
        };

        let error = SuiteRunner::new(&suite, &dispatcher, &mut fixture)
            .run()
            .await
            .unwrap_err();

        assert_eq!(error.kind(), FatalKind::Fixture);
        assert!(dispatcher.sent_paths().is_empty());
    }

    #[tokio::test]
    async fn transport_error_stops_the_suite_and_keeps_earlier_outcomes() {
        let suite = three_case_suite();
        let dispatcher = ScriptedDispatcher::new(vec![
            ok(200, "{}"),
            Err(TransportError::ConnectionRefused {
                host: "127.0.0.1".to_string(),
                port: 9191,
            }),
        ]);
        let mut fixture = CountingFixture::default();
        let mut runner = SuiteRunner::new(&suite, &dispatcher, &mut fixture);

        let error = runner.run_to_end().await.unwrap_err();
        assert!(matches!(error, RunError::Transport { case: 2, .. }));
        assert_eq!(runner.state(), SuiteState::Running(1));

        let report = runner.finish();
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(dispatcher.sent_paths(), vec!["/first", "/second"]);
    }

    #[tokio::test]
    async fn non_json_response_is_fatal() {
        let suite = three_case_suite();
        let dispatcher = ScriptedDispatcher::new(vec![ok(200, "Internal Server Error")]);
        let mut fixture = CountingFixture::default();

        let error = SuiteRunner::new(&suite, &dispatcher, &mut fixture)
            .run()
            .await
            .unwrap_err();

        assert_eq!(error.kind(), FatalKind::MalformedResponse);
    }

    #[tokio::test]
    async fn empty_suite_still_resets() {
        let suite = TestSuite::new("empty", Vec::new());
        let dispatcher = ScriptedDispatcher::new(Vec::new());
        let mut fixture = CountingFixture::default();

        let report = SuiteRunner::new(&suite, &dispatcher, &mut fixture)
            .run()
            .await
            .unwrap();

        assert!(report.outcomes.is_empty());
        assert_eq!(fixture.resets, 1);
    }
}
