//! Data management page: table row counts plus export and import forms

use axum::{extract::State, response::Html};
use pipeline_common::db;

use super::layout::escape;
use super::render;
use crate::{AppState, ApiResult};

/// GET /data
pub async fn data_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let tables = db::tables::list_tables(&state.db).await?;

    let rows: String = tables
        .iter()
        .map(|t| format!("<tr><td>{}</td><td>{}</td></tr>", escape(&t.name), t.row_count))
        .collect();

    let body = format!(
        r#"<section>
    <h3>Export</h3>
    <p><a class="button" href="/export">Download JSON export</a></p>
</section>
<section>
    <h3>Import</h3>
    <p>Rows whose id already exists are skipped. Projects, prompts and dock settings are not imported.</p>
    <p>Text fields must not be null: a row with a null text value (older exports) is counted as skipped.</p>
    <form method="post" action="/import" enctype="multipart/form-data" class="card">
        <input type="file" name="file" accept=".json,application/json">
        <button>Import</button>
    </form>
</section>
<section>
    <h3>Tables</h3>
    <table><tr><th>Table</th><th>Rows</th></tr>{rows}</table>
</section>"#,
        rows = rows,
    );

    Ok(render(&state, "Data", &body).await)
}
