use crate::errors::HarnessResult;
use crate::workloads;
use clap::Args;

#[derive(Args)]
pub struct ListCommand {
    /// Emit the workload list as JSON
    #[arg(long)]
    json: bool,
}

impl ListCommand {
    pub fn run(&self) -> HarnessResult<()> {
        let registry = workloads::builtins();

        if self.json {
            let infos: Vec<_> = registry.iter().map(|w| w.info()).collect();
            println!("{}", serde_json::to_string_pretty(&infos)?);
            return Ok(());
        }

        println!("Registered workloads ({}):", registry.len());
        for workload in registry.iter() {
            let descriptor = workload.descriptor();
            println!(
                "  {:<20} threads={:<3} iterations={:<6} states={}",
                descriptor.name,
                descriptor.threads,
                descriptor.iterations,
                workload.transitions().state_count()
            );
        }
        Ok(())
    }
}
