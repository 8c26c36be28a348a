use crate::cli::{SwimlaneAction, SwimlaneUpdateArgs};
use crate::context::CliContext;
use crate::output;
use birdseye_domain::SwimlaneUpdate;

pub async fn handle(ctx: &mut CliContext, action: SwimlaneAction) -> anyhow::Result<()> {
    match action {
        SwimlaneAction::Add { name } => {
            let before = ctx.swimlane_ids();
            ctx.store.add_swimlane(&name)?;
            ctx.commit().await?;
            output::output_success(ctx.new_swimlane(&before)?)?;
        }
        SwimlaneAction::Update(args) => {
            handle_update(ctx, args).await?;
        }
        SwimlaneAction::Delete { id } => {
            ctx.swimlane(id)?;
            ctx.store.delete_swimlane(id)?;
            ctx.commit().await?;
            output::output_success(serde_json::json!({ "deleted": id.to_string() }))?;
        }
    }
    Ok(())
}

async fn handle_update(ctx: &mut CliContext, args: SwimlaneUpdateArgs) -> anyhow::Result<()> {
    ctx.swimlane(args.id)?;
    let update = SwimlaneUpdate {
        name: args.name,
        is_open: args.open,
        ..Default::default()
    };
    ctx.store.update_swimlane(args.id, update)?;
    ctx.commit().await?;
    output::output_success(ctx.swimlane(args.id)?)
}
