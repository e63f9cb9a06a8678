//! Dashboard page - counters, combinatorial funnel and the combo picker

use axum::{extract::State, response::Html};
use pipeline_common::{db, stats};

use super::layout::{escape, id_options, opt, thumbnail};
use super::render;
use crate::{AppState, ApiResult};

const RECENT_MEDIA: i64 = 6;
const RECENT_JOBS: i64 = 5;

/// GET /
pub async fn dashboard_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let counts = stats::dashboard_counts(&state.db).await?;
    let funnel = stats::compute_funnel(&state.db).await?;
    let recent_media = db::media::recent_media(&state.db, RECENT_MEDIA).await?;
    let recent_jobs = db::jobs::recent_jobs(&state.db, RECENT_JOBS).await?;
    let characters = db::characters::list_eligible_characters(&state.db).await?;
    let output_types = db::output_types::list_output_types(&state.db).await?;

    let counters = [
        ("Archetypes", counts.archetypes),
        ("Characters", counts.characters),
        ("Ingredients", counts.ingredients),
        ("Output Types", counts.output_types),
        ("Media Assets", counts.media_total),
        ("Top Layer", counts.top_layer),
    ]
    .iter()
    .map(|(label, n)| format!(r#"<div class="counter"><span>{}</span><b>{}</b></div>"#, label, n))
    .collect::<String>();

    let funnel_html = [
        ("Possible", funnel.total_possible),
        ("Planned", funnel.total_planned),
        ("Rendered", funnel.total_rendered),
        ("Imported", funnel.total_imported),
        ("Fully annotated", funnel.total_meta_complete),
    ]
    .iter()
    .map(|(label, n)| format!(r#"<li><span>{}</span><b>{}</b></li>"#, label, n))
    .collect::<String>();

    let media_html = recent_media
        .iter()
        .map(|m| {
            format!(
                r#"<div class="card">{}<div>{}</div><small>{} · {}</small></div>"#,
                thumbnail(&m.media.file_path),
                escape(&m.media.title),
                opt(&m.character_name),
                m.media.quality_status
            )
        })
        .collect::<String>();

    let jobs_html = recent_jobs
        .iter()
        .map(|j| {
            format!(
                "<tr><td>#{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                j.job.id,
                opt(&j.character_name),
                opt(&j.output_type_name),
                j.job.status
            )
        })
        .collect::<String>();

    let body = format!(
        r#"<section class="counters">{counters}</section>
<section>
    <h3>Combination funnel</h3>
    <ol class="funnel">{funnel_html}</ol>
</section>
<section id="combo-picker">
    <h3>Random combo</h3>
    <label>Character <select id="combo-char">{char_options}</select></label>
    <label>Output type <select id="combo-ot">{ot_options}</select></label>
    <button type="button" id="combo-roll">Roll</button>
    <div id="combo-result"></div>
</section>
<section>
    <h3>Recent media</h3>
    <div class="cards">{media_html}</div>
</section>
<section>
    <h3>Recent jobs</h3>
    <table><tr><th>Job</th><th>Character</th><th>Output</th><th>Status</th></tr>{jobs_html}</table>
</section>"#,
        counters = counters,
        funnel_html = funnel_html,
        char_options = id_options(&characters, None, |c| c.id, |c| c.name.clone()),
        ot_options = id_options(&output_types, None, |o| o.id, |o| o.name.clone()),
        media_html = media_html,
        jobs_html = jobs_html,
    );

    Ok(render(&state, "Dashboard", &body).await)
}
