use hacs_data::category::GenerationSummary;
use hacs_data::config::{Config, FailurePolicy};
use hacs_data::core::DataResult;
use hacs_data::di::ServiceContainer;
use std::path::PathBuf;

pub struct GenerateOptions {
    pub category: String,
    pub repository: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub abort_on_error: bool,
}

pub async fn run(mut config: Config, options: GenerateOptions) -> DataResult<()> {
    if let Some(dir) = options.output_dir {
        config.output_dir = dir;
    }
    if options.abort_on_error {
        config.failure_policy = FailurePolicy::Abort;
    }

    let container = ServiceContainer::new(config)?;
    let generator = container.generator();
    let summary = generator
        .generate(&options.category, options.repository.as_deref())
        .await?;

    print_summary(&summary, generator.output_dir());
    Ok(())
}

fn print_summary(summary: &GenerationSummary, output_dir: &std::path::Path) {
    println!(
        "✓ {}: {}/{} repositories fetched, {} in repositories.json",
        summary.category,
        summary.fetched.len(),
        summary.total,
        summary.members
    );
    println!("  Output: {}", output_dir.join(&summary.category).display());

    if !summary.dropped.is_empty() {
        println!("  Dropped: {}", summary.dropped.join(", "));
    }
    if summary.has_failures() {
        println!("  Skipped {} repositories:", summary.failed.len());
        for (repository, error) in &summary.failed {
            println!("    {}: {}", repository, error);
        }
    }
}
