//! Step 12: Redis cache

use super::templates;
use super::{apt_install, canvas_config_path, rendered, CANVAS_USER};
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct RedisStep;

#[async_trait]
impl Step for RedisStep {
    fn name(&self) -> &'static str {
        "Setup Redis Cache"
    }

    fn description(&self) -> &'static str {
        "Setting up Redis cache"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.detail("Installing Redis server");
        ctx.sh(
            "add-apt-repository -y ppa:chris-lea/redis-server",
            "Redis installation",
        )
        .await?;
        ctx.sh("apt-get update", "Redis installation").await?;
        ctx.sh(apt_install("redis-server"), "Redis installation")
            .await?;

        ctx.sh("systemctl start redis-server", "Starting Redis").await?;
        ctx.sh("systemctl enable redis-server", "Enabling Redis").await?;

        ctx.detail("Configuring cache store");
        let cache_store = rendered("cache_store.yml", templates::cache_store_yml())?;
        ctx.write_file(
            canvas_config_path("cache_store.yml"),
            &cache_store,
            Some(CANVAS_USER),
        )
        .await?;

        let redis = rendered("redis.yml", templates::redis_yml())?;
        ctx.write_file(canvas_config_path("redis.yml"), &redis, Some(CANVAS_USER))
            .await?;

        ctx.sh("systemctl restart redis-server", "Restarting Redis")
            .await?;
        Ok(())
    }
}
