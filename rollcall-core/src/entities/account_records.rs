use crate::entities::Account;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
/// Insert an account. Returns `None` if the email is already registered.
pub struct InsertAccountRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl Processor<InsertAccountRecord> for DatabaseProcessor {
    type Output = Option<AccountRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertAccountRecord")]
    async fn process(&self, insert: InsertAccountRecord) -> Result<Option<AccountRow>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(insert.id)
        .bind(insert.name)
        .bind(insert.email)
        .bind(insert.password_hash)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetAccountRecordByEmail {
    pub email: String,
}

impl Processor<GetAccountRecordByEmail> for DatabaseProcessor {
    type Output = Option<AccountRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAccountRecordByEmail")]
    async fn process(&self, query: GetAccountRecordByEmail) -> Result<Option<AccountRow>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(query.email)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetAccountRecordById {
    pub account_id: Uuid,
}

impl Processor<GetAccountRecordById> for DatabaseProcessor {
    type Output = Option<AccountRow>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAccountRecordById")]
    async fn process(&self, query: GetAccountRecordById) -> Result<Option<AccountRow>, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(query.account_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// `(id, name)` pairs for a batch of accounts, used to label event creators.
#[derive(Debug, Clone)]
pub struct GetAccountNamesByIds {
    pub account_ids: Vec<Uuid>,
}

impl Processor<GetAccountNamesByIds> for DatabaseProcessor {
    type Output = Vec<(Uuid, String)>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAccountNamesByIds")]
    async fn process(&self, query: GetAccountNamesByIds) -> Result<Vec<(Uuid, String)>, sqlx::Error> {
        sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT id, name
            FROM accounts
            WHERE id = ANY($1)
            "#,
        )
        .bind(query.account_ids)
        .fetch_all(&self.pool)
        .await
    }
}
