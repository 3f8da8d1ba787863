//! Step 3: PostgreSQL server, role and databases

use super::{apt_install, CANVAS_USER};
use crate::core::{Step, StepContext, StepError};
use crate::execution::shell_quote;
use async_trait::async_trait;

const DATABASES: [&str; 2] = ["canvas_production", "canvas_development"];

/// Quote a value as a SQL string literal
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `psql` as the postgres superuser, with the SQL shell-quoted
fn psql(sql: &str) -> String {
    format!("sudo -u postgres psql -v ON_ERROR_STOP=1 -c {}", shell_quote(sql))
}

/// Probe that succeeds when the query returns a row
fn psql_exists(sql: &str) -> String {
    format!("sudo -u postgres psql -tAc {} | grep -q 1", shell_quote(sql))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresStep;

impl PostgresStep {
    async fn role_exists(ctx: &StepContext<'_>, role: &str) -> bool {
        ctx.probe(&psql_exists(&format!(
            "SELECT 1 FROM pg_roles WHERE rolname = {}",
            sql_literal(role)
        )))
        .await
    }

    async fn database_exists(ctx: &StepContext<'_>, database: &str) -> bool {
        ctx.probe(&psql_exists(&format!(
            "SELECT 1 FROM pg_database WHERE datname = {}",
            sql_literal(database)
        )))
        .await
    }
}

#[async_trait]
impl Step for PostgresStep {
    fn name(&self) -> &'static str {
        "Install PostgreSQL & Setup Databases"
    }

    fn description(&self) -> &'static str {
        "Installing PostgreSQL and creating the Canvas databases"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.detail("Installing PostgreSQL");
        let install = [
            "apt-get update".to_string(),
            apt_install("wget ca-certificates"),
            "set -o pipefail; wget -qO - https://www.postgresql.org/media/keys/ACCC4CF8.asc | tee /etc/apt/trusted.gpg.d/postgresql.asc > /dev/null".to_string(),
            r#"echo "deb http://apt.postgresql.org/pub/repos/apt/ $(lsb_release -cs)-pgdg main" > /etc/apt/sources.list.d/pgdg.list"#.to_string(),
            "apt-get update".to_string(),
            apt_install("postgresql-14"),
        ];
        let total = install.len();
        for (i, command) in install.into_iter().enumerate() {
            ctx.sh(command, format!("PostgreSQL install step {}/{}", i + 1, total))
                .await?;
        }

        ctx.detail("Creating PostgreSQL user and databases");
        let password = sql_literal(&ctx.config.canvas_password);
        let role_sql = if Self::role_exists(ctx, CANVAS_USER).await {
            format!("ALTER USER {} WITH PASSWORD {};", CANVAS_USER, password)
        } else {
            format!("CREATE USER {} WITH PASSWORD {};", CANVAS_USER, password)
        };
        ctx.run(
            ctx.command(psql(&role_sql))
                .describe("Setting PostgreSQL canvas user password")
                .captured()
                .sensitive(),
        )
        .await?;

        for database in DATABASES {
            if Self::database_exists(ctx, database).await {
                ctx.detail(&format!("Database {} already exists", database));
                continue;
            }
            ctx.sh(
                format!("sudo -u postgres createdb {} --owner={}", database, CANVAS_USER),
                format!("Creating database {}", database),
            )
            .await?;
        }

        let admin = std::env::var("USER").unwrap_or_else(|_| "root".to_string());
        if !Self::role_exists(ctx, &admin).await {
            ctx.sh(
                format!("sudo -u postgres createuser {}", shell_quote(&admin)),
                format!("Creating PostgreSQL role {}", admin),
            )
            .await?;
        }
        ctx.sh(
            psql(&format!("ALTER USER \"{}\" WITH SUPERUSER;", admin.replace('"', "\"\""))),
            format!("Granting superuser to {}", admin),
        )
        .await?;

        Ok(())
    }
}
