use std::collections::HashMap;

use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::audit::Stamp;
use crate::db::repo::Entity;
use crate::models::{EnvironmentVariable, NewEnvironmentVariable};

/// Partial unique index over alive variables: one name per app.
pub const NAME_APP_KEY: &str = "environment_variables_name_app_alive_key";

impl Entity for EnvironmentVariable {
    const TABLE: &'static str = "environment_variables";
    const LABEL: &'static str = "Environment variable";
}

/// Postgres caps a statement at 65535 bind parameters; each row binds 8.
const ROWS_PER_STATEMENT: usize = 65535 / 8;

/// Insert every variable for an app, chunked to stay under the bind limit.
/// Run it inside a transaction so a failed chunk takes the whole batch with
/// it. The result follows the input order.
pub async fn insert_batch(
    conn: &mut PgConnection,
    stamp: &Stamp,
    app_id: Uuid,
    variables: &[NewEnvironmentVariable],
) -> Result<Vec<EnvironmentVariable>, sqlx::Error> {
    let stamps: Vec<Stamp> = variables.iter().map(|_| stamp.next()).collect();
    let mut inserted: HashMap<Uuid, EnvironmentVariable> = HashMap::with_capacity(variables.len());

    for (chunk, chunk_stamps) in variables
        .chunks(ROWS_PER_STATEMENT)
        .zip(stamps.chunks(ROWS_PER_STATEMENT))
    {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO environment_variables
                 (public_id, app_id, name, value, created_at, updated_at, created_by, updated_by) ",
        );
        builder.push_values(chunk.iter().zip(chunk_stamps), |mut row, (variable, row_stamp)| {
            row.push_bind(row_stamp.id)
                .push_bind(app_id)
                .push_bind(variable.name.clone())
                .push_bind(variable.value.clone())
                .push_bind(row_stamp.at)
                .push_bind(row_stamp.at)
                .push_bind(row_stamp.actor)
                .push_bind(row_stamp.actor);
        });
        builder.push(" RETURNING *");

        let rows = builder
            .build_query_as::<EnvironmentVariable>()
            .fetch_all(&mut *conn)
            .await?;
        inserted.extend(rows.into_iter().map(|row| (row.public_id, row)));
    }

    Ok(stamps
        .iter()
        .filter_map(|row_stamp| inserted.remove(&row_stamp.id))
        .collect())
}
