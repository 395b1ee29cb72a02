//! Whole-run orchestration.
//!
//! The engine starts the fixture once, runs every registered suite in order
//! and always stops the fixture at the end, whatever happened in between.

use tracing::{debug, error, info};

use blackbox_domain::RunReport;

use crate::error::{RunError, RunResult};
use crate::ports::{Dispatcher, Fixture, FixtureHandle, TransportError};
use crate::registry::SuiteRegistry;
use crate::runner::SuiteRunner;

/// Runs suites against a fixture.
pub struct Engine<F> {
    fixture: F,
}

impl<F: Fixture> Engine<F> {
    /// Creates an engine owning `fixture`.
    pub const fn new(fixture: F) -> Self {
        Self { fixture }
    }

    /// Consumes the engine and returns the fixture.
    pub fn into_fixture(self) -> F {
        self.fixture
    }

    /// Runs every suite in `registry`.
    ///
    /// `connect` builds the dispatcher from the handle returned by
    /// [`Fixture::start`]. [`Fixture::stop`] is called exactly once before
    /// returning, including after a failed start or a hard failure. Hard
    /// failures end up in [`RunReport::fatal`]; the report always lists the
    /// suites that ran, including a partially run one.
    pub async fn run<D, C>(&mut self, registry: &SuiteRegistry, connect: C) -> RunReport
    where
        D: Dispatcher,
        C: FnOnce(&FixtureHandle) -> Result<D, TransportError>,
    {
        let mut report = RunReport::new();
        info!(
            run_id = %report.run_id,
            suites = registry.len(),
            cases = registry.total_cases(),
            "starting run"
        );

        if let Err(error) = self.run_suites(registry, connect, &mut report).await {
            error!(kind = %error.kind(), "run aborted: {error}");
            report.abort(error.to_fatal());
        }

        match self.fixture.stop().await {
            Ok(()) => debug!("fixture stopped"),
            Err(source) => {
                let error = RunError::Stop(source);
                error!("{error}");
                report.abort(error.to_fatal());
            }
        }

        info!(
            run_id = %report.run_id,
            cases = report.total_cases(),
            failed = report.failed_cases(),
            exit_code = report.exit_code(),
            "run finished"
        );
        report
    }

    async fn run_suites<D, C>(
        &mut self,
        registry: &SuiteRegistry,
        connect: C,
        report: &mut RunReport,
    ) -> RunResult<()>
    where
        D: Dispatcher,
        C: FnOnce(&FixtureHandle) -> Result<D, TransportError>,
    {
        let handle = self.fixture.start().await.map_err(RunError::Start)?;
        info!(base_url = %handle.base_url, "fixture started");
        let dispatcher = connect(&handle).map_err(RunError::Setup)?;

        for suite in registry {
            let mut runner = SuiteRunner::new(suite, &dispatcher, &mut self.fixture);
            let outcome = runner.run_to_end().await;
            report.push_suite(runner.finish());
            outcome?;
        }
        Ok(())
    }
}
