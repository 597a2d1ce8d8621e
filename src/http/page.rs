use axum::{extract::State, response::Html};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::spot::{format_float, Spot};
use crate::service::{MapView, Path, SpotService};

pub const APP_NAME: &str = "Le iMapette";

#[derive(Serialize)]
struct PathPoint {
    lat: f64,
    lng: f64,
    timestamp: i64,
}

#[derive(Serialize)]
struct PathJson<'a> {
    user_id: &'a str,
    points: Vec<PathPoint>,
}

pub async fn index(State(service): State<SpotService>) -> Result<Html<String>> {
    let view = service.map_view().await?;
    Ok(Html(render(&view)))
}

fn render(view: &MapView) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(APP_NAME)));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(APP_NAME)));

    html.push_str("<h2>Spots</h2>\n");
    spots_table(&mut html, &view.spots, true);

    html.push_str("<h2>Users</h2>\n<table>\n<tr><th>User</th><th>Privacy</th></tr>\n");
    for user in &view.users {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape(&user.user_id),
            if user.is_shared() { "shared" } else { "private" }
        ));
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Paths</h2>\n");
    for path in &view.paths {
        html.push_str(&format!(
            "<section class=\"path\" data-user=\"{0}\">\n<h3>{0}</h3>\n",
            escape(&path.user_id)
        ));
        spots_table(&mut html, &path.spots, false);
        html.push_str("</section>\n");
    }

    html.push_str("<script type=\"application/json\" id=\"paths\">");
    html.push_str(&paths_json(&view.paths));
    html.push_str("</script>\n</body>\n</html>\n");

    html
}

fn spots_table(html: &mut String, spots: &[Spot], with_owner: bool) {
    html.push_str("<table>\n<tr>");
    if with_owner {
        html.push_str("<th>User</th>");
    }
    html.push_str(
        "<th>Latitude</th><th>Longitude</th><th>Accuracy</th><th>Altitude</th><th>Speed</th><th>Time</th></tr>\n",
    );
    for spot in spots {
        html.push_str("<tr>");
        if with_owner {
            html.push_str(&format!("<td>{}</td>", escape(&spot.user_id)));
        }
        html.push_str(&format!(
            "<td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            format_float(spot.latd),
            format_float(spot.longd),
            format_float(spot.accuracy),
            format_float(spot.altitude),
            format_float(spot.speed),
            format_time(spot.timestamp),
        ));
    }
    html.push_str("</table>\n");
}

fn format_time(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Paths as JSON for client-side drawing, safe to inline in a script block.
fn paths_json(paths: &[Path]) -> String {
    let paths: Vec<PathJson> = paths
        .iter()
        .map(|path| PathJson {
            user_id: &path.user_id,
            points: path
                .spots
                .iter()
                .map(|spot| PathPoint {
                    lat: spot.latd,
                    lng: spot.longd,
                    timestamp: spot.timestamp,
                })
                .collect(),
        })
        .collect();

    serde_json::to_string(&paths)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
