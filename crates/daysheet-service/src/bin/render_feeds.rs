//! Offline planner rendering: local `.ics` files in, PDF out.
//!
//! Usage: `render-feeds <out.pdf> <start YYYY-MM-DD> <end YYYY-MM-DD> <feed.ics>...`
//!
//! Hours, to-do section and display zone come from the usual settings.

use anyhow::{Context, bail};
use chrono::Local;
use daysheet_core::config::load_config;
use daysheet_service::generate::{PlannerForm, PlannerRequest, generate_document};
use daysheet_service::planner::zone::resolve_display_zone;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(config.logging.level.as_str()).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [output, start, end, feeds @ ..] = args.as_slice() else {
        bail!("usage: render-feeds <out.pdf> <start YYYY-MM-DD> <end YYYY-MM-DD> <feed.ics>...");
    };

    let form = PlannerForm {
        ical_urls: String::new(),
        start_date: Some(start.clone()),
        end_date: Some(end.clone()),
        start_hour: Some(config.planner.start_hour.to_string()),
        end_hour: Some(config.planner.end_hour.to_string()),
        show_todos: config.planner.show_todos.then(|| "on".to_owned()),
    };
    let request = PlannerRequest::with_sources(feeds.to_vec(), &form, Local::now().date_naive(), &config.planner)?;

    let blobs: Vec<Option<Vec<u8>>> = request
        .sources
        .iter()
        .map(|path| match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(%path, error = %err, "Could not read feed file");
                None
            }
        })
        .collect();

    let tz = resolve_display_zone(&config.planner.timezone);
    let rendered = generate_document(&request, &blobs, tz)?;
    std::fs::write(output, &rendered.pdf).with_context(|| format!("writing {output}"))?;

    tracing::info!(
        %output,
        occurrences = rendered.occurrence_count,
        "Planner written"
    );
    Ok(())
}
