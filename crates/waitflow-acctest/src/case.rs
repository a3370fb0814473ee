//! Test case driver: apply each step, check, destroy, verify destruction

use crate::check::{CheckError, CheckFn};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use waitflow_cloud::{CloudError, Engine, ProviderRegistry, State, StateManager, parse_config};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type PreCheckFn = Box<dyn Fn() -> Result<(), AccTestError>>;
type DestroyFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>>>>;
type DestroyCheckFn = Box<dyn Fn(State) -> DestroyFuture>;

#[derive(Error, Debug)]
pub enum AccTestError {
    #[error("pre-check failed: {0}")]
    PreCheck(String),

    #[error("step {step}: invalid config: {source}")]
    Config {
        step: usize,
        #[source]
        source: CloudError,
    },

    #[error("step {step}: apply failed: {message}")]
    Apply { step: usize, message: String },

    #[error("step {step}: plan not empty after apply ({summary})")]
    NonEmptyPlan { step: usize, summary: String },

    #[error("step {step}: check failed: {source}")]
    Check {
        step: usize,
        #[source]
        source: CheckError,
    },

    #[error("destroy failed: {0}")]
    Destroy(String),

    #[error("destroy check failed: {0}")]
    CheckDestroy(BoxError),

    #[error(transparent)]
    Cloud(#[from] CloudError),
}

/// One configuration to apply and the checks to run afterwards
pub struct TestStep {
    pub config: String,
    pub check: Option<CheckFn>,
}

impl TestStep {
    pub fn new(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            check: None,
        }
    }

    pub fn check(mut self, check: CheckFn) -> Self {
        self.check = Some(check);
        self
    }
}

/// An acceptance test: steps applied in order, then a full destroy
pub struct TestCase {
    pre_check: Option<PreCheckFn>,
    providers: ProviderRegistry,
    steps: Vec<TestStep>,
    check_destroy: Option<DestroyCheckFn>,
    work_dir: Option<PathBuf>,
}

impl TestCase {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self {
            pre_check: None,
            providers,
            steps: Vec::new(),
            check_destroy: None,
            work_dir: None,
        }
    }

    pub fn pre_check(mut self, f: impl Fn() -> Result<(), AccTestError> + 'static) -> Self {
        self.pre_check = Some(Box::new(f));
        self
    }

    pub fn step(mut self, step: TestStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Verification run after destroy, given the state as it was before destroy
    pub fn check_destroy<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(State) -> Fut + 'static,
        Fut: Future<Output = Result<(), E>> + 'static,
        E: Into<BoxError>,
    {
        self.check_destroy = Some(Box::new(move |state| -> DestroyFuture {
            let fut = f(state);
            Box::pin(async move { fut.await.map_err(Into::into) })
        }));
        self
    }

    /// Persist state under this directory after every step
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Run the test case
    ///
    /// Resources are destroyed and the destroy check runs even when a step
    /// fails; the step error wins.
    pub async fn run(self) -> Result<(), AccTestError> {
        if let Some(pre_check) = &self.pre_check {
            pre_check()?;
        }

        let engine = Engine::new(self.providers);
        let state_manager = self.work_dir.as_ref().map(StateManager::new);
        let mut state = State::new();
        let mut outcome = Ok(());

        for (index, step) in self.steps.iter().enumerate() {
            let step_no = index + 1;
            tracing::info!("Running step {}", step_no);

            outcome = run_step(&engine, step_no, step, &mut state).await;

            if let Some(manager) = &state_manager {
                manager.save(&state).await?;
            }
            if outcome.is_err() {
                break;
            }
        }

        let recorded = state.clone();
        let destroyed = engine.destroy(&mut state).await?;
        if let Some(manager) = &state_manager {
            manager.save(&state).await?;
        }
        if !destroyed.is_success() {
            return outcome.and(Err(AccTestError::Destroy(destroyed.failure_summary())));
        }

        // Verified even after a failed step so leaked objects are reported
        let verified = match &self.check_destroy {
            Some(check_destroy) => {
                tracing::info!("Verifying destroy of {} resource(s)", recorded.resources.len());
                check_destroy(recorded)
                    .await
                    .map_err(AccTestError::CheckDestroy)
            }
            None => Ok(()),
        };
        if let (Err(_), Err(e)) = (&outcome, &verified) {
            tracing::error!("{}", e);
        }

        outcome.and(verified)
    }
}

async fn run_step(
    engine: &Engine,
    step_no: usize,
    step: &TestStep,
    state: &mut State,
) -> Result<(), AccTestError> {
    let desired = parse_config(&step.config).map_err(|source| AccTestError::Config {
        step: step_no,
        source,
    })?;

    let plan = engine.plan(&desired, state)?;
    let result = engine.apply(&plan, state).await?;
    if !result.is_success() {
        return Err(AccTestError::Apply {
            step: step_no,
            message: result.failure_summary(),
        });
    }

    // A refreshed state must already satisfy the configuration
    engine.refresh(state).await?;
    let follow_up = engine.plan(&desired, state)?;
    if follow_up.has_changes {
        return Err(AccTestError::NonEmptyPlan {
            step: step_no,
            summary: follow_up.summary().to_string(),
        });
    }

    if let Some(check) = &step.check {
        check(state).map_err(|source| AccTestError::Check {
            step: step_no,
            source,
        })?;
    }
    Ok(())
}
