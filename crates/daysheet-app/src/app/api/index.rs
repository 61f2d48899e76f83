use salvo::writing::Text;
use salvo::{Depot, Response, handler};

use crate::config::{PlannerConfig, get_config_from_depot};

const PAGE: &str = include_str!("index.html");

/// ## Summary
/// Serves the planner form, pre-filled with the configured defaults.
#[handler]
pub async fn index(depot: &Depot, res: &mut Response) {
    let planner = get_config_from_depot(depot)
        .map(|settings| settings.planner.clone())
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Settings missing, serving built-in defaults");
            PlannerConfig::default()
        });
    res.render(Text::Html(render_page(&planner)));
}

fn render_page(planner: &PlannerConfig) -> String {
    PAGE.replace("{{start_hour}}", &planner.start_hour.to_string())
        .replace("{{end_hour}}", &planner.end_hour.to_string())
        .replace("{{todos_checked}}", if planner.show_todos { "checked" } else { "" })
}
