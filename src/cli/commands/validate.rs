use crate::errors::{HarnessError, HarnessResult};
use crate::workload::lint;
use crate::workloads;
use clap::Args;

#[derive(Args)]
pub struct ValidateCommand {
    /// Exit non-zero when any lint warning is found
    #[arg(long)]
    deny: bool,
}

impl ValidateCommand {
    pub fn run(&self) -> HarnessResult<()> {
        let registry = workloads::builtins();
        let mut warning_count = 0usize;

        for workload in registry.iter() {
            let warnings = lint(workload.as_ref());
            if warnings.is_empty() {
                println!("{}: ok", workload.descriptor().name);
            } else {
                warning_count += warnings.len();
                for warning in warnings {
                    println!("warning: {}", warning);
                }
            }
        }

        println!(
            "Checked {} workload(s), {} warning(s)",
            registry.len(),
            warning_count
        );
        if self.deny && warning_count > 0 {
            return Err(HarnessError::Config(format!(
                "{} lint warning(s) with --deny set",
                warning_count
            )));
        }
        Ok(())
    }
}
