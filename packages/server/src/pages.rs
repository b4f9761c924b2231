//! Server-rendered HTML for the dashboard pages.
//!
//! Each page is the shared layout (sidebar form plus title header) around a
//! page-specific body. The sidebar is a plain `GET /` form, so changing any
//! control re-requests the page with the new parameters. Maps are embedded
//! as `srcdoc` iframes.

use resilience_map_analytics::ProximityReport;
use resilience_map_config::DashboardConfig;
use resilience_map_network_models::{FacilityKind, MAX_TREATMENT, Treatment};
use resilience_map_render::escape_html;
use resilience_map_server_models::Page;

use crate::views::Controls;

/// Height of embedded map frames, in pixels.
pub const MAP_HEIGHT_PX: u32 = 600;

/// Width of the intro illustration, in pixels.
pub const ILLUSTRATION_WIDTH_PX: u32 = 800;

const STYLE: &str = r"
body { margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; }
aside { width: 300px; padding: 1.5rem; background: #f0f2f6; box-sizing: border-box; }
aside label { display: block; margin-top: 1rem; font-size: 0.9rem; }
aside select, aside input[type=range] { width: 100%; }
aside .check { margin-top: 0.25rem; }
main { flex: 1; padding: 1.5rem 3rem; }
iframe { width: 100%; border: none; }
.error { color: #b00020; }
";

/// The intro page: how the elimination test works.
#[must_use]
pub fn intro_page(config: &DashboardConfig) -> String {
    let illustration = escape_html(&format!("/assets/{}", config.assets.illustration));
    let body = format!(
        r#"<h2>How to test the network resilience on disturbance?</h2>
<figure>
<img src="{illustration}" alt="treatment illustration" width="{ILLUSTRATION_WIDTH_PX}">
<figcaption>treatment illustration</figcaption>
</figure>
<p>Imagine how a blockage would be translated in the network. If a blockage occurs at an intersection,
all roads directly connected to that intersection would become inaccessible via that intersection.
This treatment translates to removing that particular intersection (node) from the network (graph) and is called
the elimination test. We choose the most important intersection by using betweenness centrality.</p>
<hr>
<p>In the sidebar, select '{centrality}' to display the betweenness centrality of each intersection,
and choose '{treatment}' to show up to the top {max_top} intersections and their proximity to police and fire stations.</p>"#,
        centrality = Page::Centrality.label(),
        treatment = Page::Treatment.label(),
        max_top = config.analysis.max_top_n,
    );

    layout(config, Page::Intro, "", &body)
}

/// The treatment page: ranked map plus proximity statistics.
#[must_use]
pub fn treatment_page(
    config: &DashboardConfig,
    controls: &Controls,
    map_html: &str,
    reports: &[ProximityReport],
) -> String {
    let mut sidebar = treatment_select(controls.treatment);
    sidebar.push_str(&format!(
        r#"<label for="top">show number of top intersections: <output id="top-value">{top}</output></label>
<input type="range" id="top" name="top" min="1" max="{max}" value="{top}" oninput="document.getElementById('top-value').value = this.value" onchange="this.form.submit()">
<label>show {radius} m buffer area from</label>
"#,
        top = controls.top,
        max = config.analysis.max_top_n,
        radius = config.analysis.buffer_radius_m,
    ));

    for kind in FacilityKind::all() {
        let checked = if controls.layers.contains(kind) {
            " checked"
        } else {
            ""
        };
        sidebar.push_str(&format!(
            r#"<div class="check"><input type="checkbox" id="{name}" name="{name}" value="true"{checked} onchange="this.form.submit()"> <label for="{name}" style="display:inline">{label}</label></div>
"#,
            name = kind,
            label = kind.label(),
        ));
    }

    for report in reports {
        sidebar.push_str(&format!(
            r#"<p style="color: {color}">{summary}</p>
"#,
            color = report.kind.text_color(),
            summary = escape_html(&report.summary()),
        ));
    }

    layout(config, Page::Treatment, &sidebar, &map_frame(map_html))
}

/// The centrality page: every defined score under one treatment.
#[must_use]
pub fn centrality_page(config: &DashboardConfig, treatment: Treatment, map_html: &str) -> String {
    layout(
        config,
        Page::Centrality,
        &treatment_select(treatment),
        &map_frame(map_html),
    )
}

/// A page reporting why the selected view could not be shown.
#[must_use]
pub fn error_page(config: &DashboardConfig, page: Page, message: &str) -> String {
    let body = format!(
        r#"<h2 class="error">This view is unavailable</h2>
<p>{}</p>"#,
        escape_html(message)
    );
    layout(config, page, "", &body)
}

fn treatment_select(selected: Treatment) -> String {
    let mut options = String::new();
    for value in 0..=MAX_TREATMENT {
        let attr = if value == selected.value() {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(r#"<option value="{value}"{attr}>{value}</option>"#));
    }
    format!(
        r#"<label for="treatment">How many intersections will you close?</label>
<select id="treatment" name="treatment" onchange="this.form.submit()">{options}</select>
"#
    )
}

fn map_frame(map_html: &str) -> String {
    format!(
        r#"<iframe srcdoc="{}" height="{MAP_HEIGHT_PX}"></iframe>"#,
        escape_html(map_html)
    )
}

fn layout(config: &DashboardConfig, page: Page, sidebar: &str, body: &str) -> String {
    let title = escape_html(&config.page.title);
    let article_url = escape_html(&config.page.article_url);

    let mut page_options = String::new();
    for option in Page::ALL {
        let attr = if *option == page { " selected" } else { "" };
        page_options.push_str(&format!(
            r#"<option value="{value}"{attr}>{label}</option>"#,
            value = option,
            label = option.label(),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<aside>
<form method="get" action="/">
<label for="page">Choose a page</label>
<select id="page" name="page" onchange="this.form.submit()">{page_options}</select>
{sidebar}</form>
</aside>
<main>
<h1>{title}</h1>
<h3>For full article check this <a href="{article_url}" target="_blank" rel="noopener">link</a></h3>
<hr>
{body}
</main>
</body>
</html>
"#
    )
}
