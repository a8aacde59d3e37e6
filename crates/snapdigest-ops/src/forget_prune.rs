//! The `forget-prune` action.

use snapdigest_core::{BackupConfig, Clock, Command};
use snapdigest_engine::{EngineClient, OutputMode};

use crate::error::OpsError;

/// Applies the retention policy and prunes unreferenced data.
pub struct ForgetPruneCommand<E, C> {
    config: BackupConfig,
    engine: E,
    clock: C,
}

impl<E: EngineClient, C: Clock> ForgetPruneCommand<E, C> {
    pub fn new(config: BackupConfig, engine: E, clock: C) -> Self {
        Self {
            config,
            engine,
            clock,
        }
    }

    pub fn engine_args(&self) -> Vec<String> {
        vec![
            "forget".to_string(),
            "--prune".to_string(),
            "--keep-daily".to_string(),
            self.config.keep_daily.to_string(),
            "--keep-weekly".to_string(),
            self.config.keep_weekly.to_string(),
            "--keep-monthly".to_string(),
            self.config.keep_monthly.to_string(),
        ]
    }
}

impl<E: EngineClient, C: Clock> Command for ForgetPruneCommand<E, C> {
    type Error = OpsError;

    fn name(&self) -> &'static str {
        "forget-prune"
    }

    fn run(&self) -> Result<u8, OpsError> {
        println!("Running forget/prune at {}", self.clock.now_iso());
        println!(
            "Policy: daily={} weekly={} monthly={}",
            self.config.keep_daily, self.config.keep_weekly, self.config.keep_monthly
        );

        let args = self.engine_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.engine.run_checked(&args, OutputMode::Inherit)?;

        println!("Forget/prune completed at {}", self.clock.now_iso());
        Ok(0)
    }
}
