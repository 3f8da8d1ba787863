//! Step 2: the `canvas` system account

use super::CANVAS_USER;
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct CanvasUserStep;

#[async_trait]
impl Step for CanvasUserStep {
    fn name(&self) -> &'static str {
        "Create Canvas User"
    }

    fn description(&self) -> &'static str {
        "Creating the canvas system user"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        if ctx.probe(&format!("id {}", CANVAS_USER)).await {
            ctx.detail("Canvas user already exists");
            return Ok(());
        }

        ctx.sh(
            format!("adduser --disabled-password --gecos '' {}", CANVAS_USER),
            "Creating canvas user",
        )
        .await?;
        ctx.sh(
            format!("usermod -aG sudo {}", CANVAS_USER),
            "Adding canvas user to sudo group",
        )
        .await?;
        Ok(())
    }
}
