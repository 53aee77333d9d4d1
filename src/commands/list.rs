//! The `list` command: show configured jobs.

use crate::cli::ListArgs;
use crate::config::JobsConfig;
use crate::error::Result;

pub fn cmd_list(args: ListArgs) -> Result<()> {
    let config = JobsConfig::resolve(args.config.as_deref())?;

    if config.jobs.is_empty() {
        println!("No jobs configured.");
        return Ok(());
    }

    println!("Jobs ({}):", config.jobs.len());
    println!();

    for (name, job) in &config.jobs {
        println!("  {}:", name);
        println!(
            "    When:    {}",
            job.when.map(|when| when.as_str()).unwrap_or("manual")
        );
        println!("    Command: {}", job.command);
        if let Some(workdir) = &job.workdir {
            println!("    Workdir: {}", workdir.display());
        }
        println!("    Lock:    {}", config.lock_path_for(name, job).display());
        println!();
    }

    Ok(())
}
