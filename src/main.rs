pub mod args;
pub mod r#async;
pub mod config;
pub mod error;
pub mod feed;
pub mod fs;
pub mod listing;
pub mod metadata;
pub mod pipeline;
pub mod posts;
pub mod source;
pub mod tags;

use std::sync::Arc;

use args::{Args, Commands, ProjectArgs};
use clap::Parser;
use config::Config;
use error::BarErr;
use listing::human_date;
use source::FsSource;
use tracing::{error, info};

async fn build(project: ProjectArgs) -> Result<(), BarErr> {
    let config = Config::try_from(project.path.clone())?;
    let source = Arc::new(FsSource::new(
        project.path.join(&config.content_path),
        config.extension.clone(),
    ));
    let dist_path = project.path.join(&config.dist_path);
    let report = pipeline::build(&config, source, &dist_path).await?;
    info!(
        "built {} posts, {} tags, {} files",
        report.posts, report.tags, report.files
    );
    Ok(())
}

async fn tags(project: ProjectArgs) -> Result<(), BarErr> {
    let config = Config::try_from(project.path.clone())?;
    let source = Arc::new(FsSource::new(
        project.path.join(&config.content_path),
        config.extension.clone(),
    ));
    let site = pipeline::index(source, config.extension.clone()).await?;
    for tag in site.tags.iter() {
        println!(
            "{:>4}  {:<20}  #{}",
            tag.count,
            human_date(&tag.latest_published),
            tag.tag
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .compact()
        .init();

    let result = match args.command {
        Some(Commands::Tags(project)) => tags(project).await,
        Some(Commands::Build(project)) => build(project).await,
        None => build(ProjectArgs::default()).await,
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
