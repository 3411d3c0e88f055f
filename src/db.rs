use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::storage::{NodeChannels, Sample};

pub async fn new_pool(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await
        .context("failed to connect to database")
}

pub async fn register_node(pool: &PgPool, node: &NodeChannels) -> Result<()> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO mote_nodes (node_id, serial_id, part_number, serial_number)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (node_id) DO UPDATE
        SET serial_id = EXCLUDED.serial_id, serial_number = EXCLUDED.serial_number
        "#,
    )
    .bind(i32::from(node.node_id))
    .bind(node.serial_id.as_bytes())
    .bind(node.part_number())
    .bind(node.serial_number())
    .execute(&mut *tx)
    .await
    .context("failed to upsert mote node")?;

    let uuids: Vec<Uuid> = node.channels.iter().map(|(_, u)| *u).collect();
    let names: Vec<&str> = node.channels.iter().map(|(c, _)| c.name()).collect();
    let units: Vec<&str> = node.channels.iter().map(|(c, _)| c.unit()).collect();
    let data_types: Vec<&str> = node
        .channels
        .iter()
        .map(|(c, _)| c.data_type().as_str())
        .collect();

    sqlx::query(
        r#"
        INSERT INTO mote_channels (uuid, node_id, name, unit, data_type)
        SELECT u, $2, n, un, dt FROM UNNEST($1::UUID[], $3::TEXT[], $4::TEXT[], $5::TEXT[]) AS t(u, n, un, dt)
        ON CONFLICT (uuid) DO NOTHING
        "#,
    )
    .bind(&uuids)
    .bind(i32::from(node.node_id))
    .bind(&names)
    .bind(&units)
    .bind(&data_types)
    .execute(&mut *tx)
    .await
    .context("failed to insert mote channels")?;

    tx.commit().await.context("failed to commit transaction")?;

    Ok(())
}

pub async fn bulk_insert_samples(pool: &PgPool, samples: &[Sample]) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }

    let channel_uuids: Vec<Uuid> = samples.iter().map(|s| s.channel_uuid).collect();
    let measured_ats: Vec<DateTime<Tz>> = samples.iter().map(|s| s.measured_at).collect();
    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO mote_samples (channel_uuid, measured_at, value)
        SELECT * FROM UNNEST($1::UUID[], $2::TIMESTAMPTZ[], $3::FLOAT8[])
        ON CONFLICT (channel_uuid, measured_at) DO NOTHING
        "#,
    )
    .bind(&channel_uuids)
    .bind(&measured_ats)
    .bind(&values)
    .execute(&mut *tx)
    .await
    .context("failed to execute bulk insert query")?;

    tx.commit().await.context("failed to commit transaction")?;

    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct ChannelCount {
    pub channel_uuid: Uuid,

    pub node_id: i32,

    pub name: String,

    pub samples: i64,
}

/// Sample counts since `since` for every channel reporting in `unit`.
/// Channels without samples in the window are left out.
pub async fn count_samples_by_unit(
    pool: &PgPool,
    unit: &str,
    since: DateTime<Utc>,
) -> Result<Vec<ChannelCount>> {
    sqlx::query_as::<_, ChannelCount>(
        r#"
        SELECT c.uuid AS channel_uuid, c.node_id, c.name, COUNT(*) AS samples
        FROM mote_channels c
        JOIN mote_samples s ON s.channel_uuid = c.uuid
        WHERE c.unit = $1 AND s.measured_at >= $2
        GROUP BY c.uuid, c.node_id, c.name
        ORDER BY c.node_id, c.name
        "#,
    )
    .bind(unit)
    .bind(since)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to count samples for unit {unit}"))
}
