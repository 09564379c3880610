use sqlx::PgPool;

/// Runs `kanau` processor commands against a Postgres pool.
///
/// Every SQL statement in [`crate::entities`] is a command struct with a
/// `Processor` impl on this type.
#[derive(Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
