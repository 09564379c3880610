use crate::entities::{Event, EventDetails};
use crate::framework::DatabaseProcessor;
use crate::roster::{Roster, RosterError};
use kanau::processor::Processor;
use time::OffsetDateTime;
use uuid::Uuid;

/// A row of the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: OffsetDateTime,
    pub location: Option<String>,
    pub capacity: i32,
    pub creator: Uuid,
    pub attendees: Vec<Uuid>,
    pub attendees_count: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<EventRow> for Event {
    type Error = RosterError;

    fn try_from(row: EventRow) -> Result<Self, RosterError> {
        let capacity =
            u32::try_from(row.capacity).map_err(|_| RosterError::OutOfRange(row.capacity.into()))?;
        let count = u32::try_from(row.attendees_count)
            .map_err(|_| RosterError::OutOfRange(row.attendees_count.into()))?;
        Ok(Event {
            id: row.id,
            details: EventDetails {
                title: row.title,
                description: row.description,
                date: row.date,
                location: row.location,
            },
            creator: row.creator,
            roster: Roster::from_parts(capacity, row.attendees, count)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
/// Insert a new event with an empty roster.
pub struct InsertEventRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: OffsetDateTime,
    pub location: Option<String>,
    pub capacity: i32,
    pub creator: Uuid,
}

impl Processor<InsertEventRecord> for DatabaseProcessor {
    type Output = EventRow;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertEventRecord")]
    async fn process(&self, insert: InsertEventRecord) -> Result<EventRow, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (id, title, description, date, location, capacity, creator)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, title, description, date, location, capacity, creator,
                attendees, attendees_count, created_at, updated_at
            "#,
        )
        .bind(insert.id)
        .bind(insert.title)
        .bind(insert.description)
        .bind(insert.date)
        .bind(insert.location)
        .bind(insert.capacity)
        .bind(insert.creator)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetEventRecordById {
    pub event_id: Uuid,
}

impl Processor<GetEventRecordById> for DatabaseProcessor {
    type Output = Option<EventRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventRecordById")]
    async fn process(&self, query: GetEventRecordById) -> Result<Option<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            r#"
            SELECT
                id, title, description, date, location, capacity, creator,
                attendees, attendees_count, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(query.event_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Events dated at or after `now`, soonest first.
pub struct ListUpcomingEventRecords {
    pub now: OffsetDateTime,
}

impl Processor<ListUpcomingEventRecords> for DatabaseProcessor {
    type Output = Vec<EventRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListUpcomingEventRecords")]
    async fn process(&self, query: ListUpcomingEventRecords) -> Result<Vec<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            r#"
            SELECT
                id, title, description, date, location, capacity, creator,
                attendees, attendees_count, created_at, updated_at
            FROM events
            WHERE date >= $1
            ORDER BY date ASC
            "#,
        )
        .bind(query.now)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct ListEventRecordsCreatedBy {
    pub user_id: Uuid,
}

impl Processor<ListEventRecordsCreatedBy> for DatabaseProcessor {
    type Output = Vec<EventRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListEventRecordsCreatedBy")]
    async fn process(&self, query: ListEventRecordsCreatedBy) -> Result<Vec<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            r#"
            SELECT
                id, title, description, date, location, capacity, creator,
                attendees, attendees_count, created_at, updated_at
            FROM events
            WHERE creator = $1
            ORDER BY date ASC
            "#,
        )
        .bind(query.user_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct ListEventRecordsAttendedBy {
    pub user_id: Uuid,
}

impl Processor<ListEventRecordsAttendedBy> for DatabaseProcessor {
    type Output = Vec<EventRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListEventRecordsAttendedBy")]
    async fn process(
        &self,
        query: ListEventRecordsAttendedBy,
    ) -> Result<Vec<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            r#"
            SELECT
                id, title, description, date, location, capacity, creator,
                attendees, attendees_count, created_at, updated_at
            FROM events
            WHERE $1 = ANY(attendees)
            ORDER BY date ASC
            "#,
        )
        .bind(query.user_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Append `user_id` to the roster if they are not a member and a seat is
/// free, in one statement.
///
/// Postgres locks the row for the `UPDATE` and re-evaluates the `WHERE`
/// clause against the latest committed version when it had to wait, so two
/// concurrent joins can never both see the last free seat.
///
/// Returns `None` when the predicate did not hold or the event is gone.
pub struct AddAttendeeIfAdmissible {
    pub event_id: Uuid,
    pub user_id: Uuid,
}

impl Processor<AddAttendeeIfAdmissible> for DatabaseProcessor {
    type Output = Option<EventRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:AddAttendeeIfAdmissible")]
    async fn process(&self, cmd: AddAttendeeIfAdmissible) -> Result<Option<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET attendees = array_append(attendees, $2),
                attendees_count = attendees_count + 1,
                updated_at = NOW()
            WHERE id = $1
              AND NOT ($2 = ANY(attendees))
              AND attendees_count < capacity
            RETURNING
                id, title, description, date, location, capacity, creator,
                attendees, attendees_count, created_at, updated_at
            "#,
        )
        .bind(cmd.event_id)
        .bind(cmd.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Remove `user_id` from the roster if they are a member, in one statement.
pub struct RemoveAttendeeIfPresent {
    pub event_id: Uuid,
    pub user_id: Uuid,
}

impl Processor<RemoveAttendeeIfPresent> for DatabaseProcessor {
    type Output = Option<EventRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:RemoveAttendeeIfPresent")]
    async fn process(&self, cmd: RemoveAttendeeIfPresent) -> Result<Option<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET attendees = array_remove(attendees, $2),
                attendees_count = attendees_count - 1,
                updated_at = NOW()
            WHERE id = $1
              AND $2 = ANY(attendees)
            RETURNING
                id, title, description, date, location, capacity, creator,
                attendees, attendees_count, created_at, updated_at
            "#,
        )
        .bind(cmd.event_id)
        .bind(cmd.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Apply a creator's edit. Matches only when `creator` owns the event and
/// the resulting capacity still covers the current attendance.
pub struct UpdateEventRecordIfOwned {
    pub event_id: Uuid,
    pub creator: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

impl Processor<UpdateEventRecordIfOwned> for DatabaseProcessor {
    type Output = Option<EventRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateEventRecordIfOwned")]
    async fn process(&self, cmd: UpdateEventRecordIfOwned) -> Result<Option<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                date = COALESCE($5, date),
                location = COALESCE($6, location),
                capacity = COALESCE($7, capacity),
                updated_at = NOW()
            WHERE id = $1
              AND creator = $2
              AND COALESCE($7, capacity) >= attendees_count
            RETURNING
                id, title, description, date, location, capacity, creator,
                attendees, attendees_count, created_at, updated_at
            "#,
        )
        .bind(cmd.event_id)
        .bind(cmd.creator)
        .bind(cmd.title)
        .bind(cmd.description)
        .bind(cmd.date)
        .bind(cmd.location)
        .bind(cmd.capacity)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Delete an event owned by `creator`. Returns whether a row was removed.
pub struct DeleteEventRecordIfOwned {
    pub event_id: Uuid,
    pub creator: Uuid,
}

impl Processor<DeleteEventRecordIfOwned> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteEventRecordIfOwned")]
    async fn process(&self, cmd: DeleteEventRecordIfOwned) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM events
            WHERE id = $1 AND creator = $2
            "#,
        )
        .bind(cmd.event_id)
        .bind(cmd.creator)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
