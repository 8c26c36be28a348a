use crate::cli::{CardAction, CardMoveArgs, CardUpdateArgs};
use crate::context::{CardOutput, CliContext};
use crate::output;
use birdseye_domain::{DragLocation, DragResult};
use birdseye_richtext::Document;

pub async fn handle(ctx: &mut CliContext, action: CardAction) -> anyhow::Result<()> {
    match action {
        CardAction::Add {
            swimlane_id,
            name,
            description_md,
        } => {
            let description = description_md
                .as_deref()
                .map(Document::markdown_to_stored_html)
                .unwrap_or_default();
            let before = ctx.item_ids();
            ctx.store.add_card(swimlane_id, &name, &description)?;
            ctx.commit().await?;
            output::output_success(CardOutput::from(ctx.new_card(&before)?))?;
        }
        CardAction::Get { id } => {
            output::output_success(CardOutput::from(ctx.card(id)?))?;
        }
        CardAction::Update(args) => {
            handle_update(ctx, args).await?;
        }
        CardAction::Delete { id } => {
            ctx.card(id)?;
            ctx.store.delete_card(id)?;
            ctx.commit().await?;
            output::output_success(serde_json::json!({ "deleted": id.to_string() }))?;
        }
        CardAction::Move(args) => {
            handle_move(ctx, args).await?;
        }
    }
    Ok(())
}

async fn handle_update(ctx: &mut CliContext, args: CardUpdateArgs) -> anyhow::Result<()> {
    let card = ctx.card(args.id)?;
    let name = args.name.unwrap_or_else(|| card.name.clone());
    let description = match args.description_md {
        Some(markdown) => Document::markdown_to_stored_html(&markdown),
        None => card.description.clone(),
    };
    ctx.store.update_card(args.id, &name, &description)?;
    ctx.commit().await?;
    output::output_success(CardOutput::from(ctx.card(args.id)?))
}

/// Moves a card the same way a drag does: only within its own swimlane.
async fn handle_move(ctx: &mut CliContext, args: CardMoveArgs) -> anyhow::Result<()> {
    let card = ctx.card(args.id)?;
    let swimlane_id = card.swimlane_id;
    let lane = ctx
        .state()
        .view()
        .swimlane(swimlane_id)
        .ok_or_else(|| anyhow::anyhow!("Swimlane {} is not on the board", swimlane_id))?;

    let source = lane
        .columns
        .iter()
        .find_map(|column| {
            column
                .items
                .iter()
                .position(|item| item.id == args.id)
                .map(|index| DragLocation {
                    column_id: column.column.id,
                    index,
                })
        })
        .ok_or_else(|| anyhow::anyhow!("Card {} is not on the board", args.id))?;

    let destination_len = lane
        .column(args.column_id)
        .map(|column| column.items.iter().filter(|item| item.id != args.id).count())
        .ok_or_else(|| anyhow::anyhow!("Column {} is not on the board", args.column_id))?;

    let drag = DragResult {
        item_id: args.id,
        source,
        destination: Some(DragLocation {
            column_id: args.column_id,
            index: args.index.unwrap_or(destination_len).min(destination_len),
        }),
    };
    ctx.store.handle_drag_end(swimlane_id, &drag)?;
    ctx.commit().await?;
    output::output_success(CardOutput::from(ctx.card(args.id)?))
}
