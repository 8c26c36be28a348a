use crate::context::CliContext;
use crate::output;
use birdseye_domain::{ColumnTotal, SwimlaneView};
use serde::Serialize;

#[derive(Serialize)]
struct BoardOutput<'a> {
    filter: &'a str,
    totals: Vec<ColumnTotal>,
    swimlanes: &'a [SwimlaneView],
}

pub async fn handle_show(ctx: &mut CliContext, filter: Option<String>) -> anyhow::Result<()> {
    if let Some(filter) = filter {
        ctx.store.set_filter(filter);
    }
    let state = ctx.state();
    output::output_success(BoardOutput {
        filter: state.filter(),
        totals: state.column_totals(),
        swimlanes: &state.view().swimlanes,
    })
}

pub async fn handle_archive_completed(ctx: &mut CliContext) -> anyhow::Result<()> {
    let archived = ctx.store.archive_completed();
    ctx.commit().await?;
    output::output_success(serde_json::json!({ "archived": archived }))
}
