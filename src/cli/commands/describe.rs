use crate::errors::HarnessResult;
use crate::workloads;
use clap::Args;

#[derive(Args)]
pub struct DescribeCommand {
    /// Workload name (see `list`)
    name: String,

    /// Emit the description as JSON
    #[arg(long)]
    json: bool,
}

impl DescribeCommand {
    pub fn run(&self) -> HarnessResult<()> {
        let workload = workloads::builtins().get(&self.name)?;
        let info = workload.info();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
            return Ok(());
        }

        println!("Workload '{}'", info.name);
        println!(
            "Threads: {} | Iterations: {} | Start: {}",
            info.threads, info.iterations, info.start
        );
        println!("States:");
        for state in &info.states {
            let edges = state
                .transitions
                .iter()
                .map(|t| format!("{} ({:.2})", t.target, t.probability))
                .collect::<Vec<_>>()
                .join(" | ");
            println!("  {:<12} -> {}", state.name, edges);
        }
        Ok(())
    }
}
