use diesel::prelude::*;
use diesel_async::{
    pooled_connection::{
        mobc::{Builder, Pool},
        AsyncDieselConnectionManager,
    },
    scoped_futures::ScopedFutureExt,
    AsyncConnection, AsyncPgConnection, RunQueryDsl,
};
use std::{fmt, time::Duration};

pub mod models;
pub mod query;
mod schema;
pub mod status;
#[cfg(test)]
mod tests;

pub use query::{CustomerQuery, FilterClause, SortClause};
pub use status::CustomerStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Customer,
    Note,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Customer => f.write_str("customer"),
            Entity::Note => f.write_str("note"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("getting connection from pool: {0}")]
    GetConnectionPool(#[from] mobc::Error<diesel_async::pooled_connection::PoolError>),
    #[error("result failure: {0}")]
    Result(#[from] diesel::result::Error),
    #[error("invalid query: {0}")]
    Query(#[from] query::Error),
    #[error("status: {0}")]
    Status(#[from] status::Error),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: Entity, id: String },
    #[error("{count} {entity} rows match id '{id}' - the data is inconsistent")]
    MultipleMatches {
        entity: Entity,
        id: String,
        count: usize,
    },
    #[error("{entity} '{id}' was not {action}: {reason}")]
    Conflict {
        entity: Entity,
        id: String,
        action: &'static str,
        reason: &'static str,
    },
    #[error("customer '{0}' does not exist")]
    CustomerMissing(String),
}

#[derive(Clone, Debug)]
pub struct Store {
    pool: Pool<AsyncPgConnection>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub db_url: String,
    pub max_open: u64,
    pub max_idle: u64,
    #[serde(with = "humantime_serde", default)]
    pub max_lifetime: Option<Duration>,
    #[serde(with = "humantime_serde", default)]
    pub max_idle_lifetime: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub timeout_for_get: Duration,
}

impl Config {
    pub fn with_db_url(db_url: impl Into<String>) -> Self {
        Self {
            db_url: db_url.into(),
            max_open: 10,
            max_idle: 2,
            max_lifetime: None,
            max_idle_lifetime: None,
            timeout_for_get: Duration::from_secs(5),
        }
    }
}

/// Creates the store - connections are only opened once an operation needs one
pub fn create(config: &Config) -> Store {
    Store {
        pool: create_pool(config),
    }
}

fn create_pool(config: &Config) -> mobc::Pool<AsyncDieselConnectionManager<AsyncPgConnection>> {
    let builder = Builder::new()
        .max_open(config.max_open)
        .max_idle(config.max_idle)
        .max_lifetime(
            config
                .max_lifetime
                .map(|v| v.max(Duration::from_secs(3600))),
        )
        .max_idle_lifetime(
            config
                .max_idle_lifetime
                .map(|v| v.max(Duration::from_secs(900))),
        )
        .get_timeout(Some(config.timeout_for_get.max(Duration::from_secs(5))));
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.db_url);
    builder.build(manager)
}

/// Maps the affected row count of a guarded write - anything but exactly one row is a failure
fn expect_single_row(
    affected: usize,
    entity: Entity,
    id: &str,
    action: &'static str,
    reason: &'static str,
) -> Result<(), Error> {
    match affected {
        1 => Ok(()),
        0 => Err(Error::Conflict {
            entity,
            id: id.to_owned(),
            action,
            reason,
        }),
        count => Err(Error::MultipleMatches {
            entity,
            id: id.to_owned(),
            count,
        }),
    }
}

async fn ensure_customer_exists(
    conn: &mut AsyncPgConnection,
    customer_id: &str,
) -> Result<(), Error> {
    use schema::customers;
    let count: i64 = customers::table
        .filter(customers::id.eq(customer_id))
        .count()
        .get_result(conn)
        .await?;
    match count {
        1 => Ok(()),
        _ => Err(Error::CustomerMissing(customer_id.to_owned())),
    }
}

impl Store {
    async fn connection(
        &self,
    ) -> Result<mobc::Connection<AsyncDieselConnectionManager<AsyncPgConnection>>, Error> {
        self.pool.get().await.map_err(Into::into)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<models::CustomerRecord>, Error> {
        use schema::customers;
        let mut conn = self.connection().await?;
        let customers = customers::table
            .select(models::Customer::as_select())
            .load(&mut conn)
            .await?;
        into_records(customers)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customers_filtered(
        &self,
        filters: &[FilterClause],
        sorts: &[SortClause],
    ) -> Result<Vec<models::CustomerRecord>, Error> {
        let query = CustomerQuery::compile(filters, sorts)?;
        self.list_customers_matching(&query).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_customers_matching(
        &self,
        query: &CustomerQuery,
    ) -> Result<Vec<models::CustomerRecord>, Error> {
        let mut conn = self.connection().await?;
        let customers = query
            .to_boxed()
            .load::<models::Customer>(&mut conn)
            .await?;
        into_records(customers)
    }

    #[tracing::instrument(skip(self))]
    pub async fn load_customer_with_notes(
        &self,
        customer_id: &str,
    ) -> Result<models::CustomerWithNotes, Error> {
        use schema::{customer_notes, customers};
        let mut conn = self.connection().await?;
        let mut matching = customers::table
            .filter(customers::id.eq(customer_id))
            .select(models::Customer::as_select())
            .load(&mut conn)
            .await?;
        let customer = match matching.len() {
            1 => matching.remove(0),
            0 => {
                return Err(Error::NotFound {
                    entity: Entity::Customer,
                    id: customer_id.to_owned(),
                })
            }
            count => {
                return Err(Error::MultipleMatches {
                    entity: Entity::Customer,
                    id: customer_id.to_owned(),
                    count,
                })
            }
        };
        let notes = customer_notes::table
            .filter(customer_notes::customer.eq(&customer.id))
            .select(models::CustomerNote::as_select())
            .load(&mut conn)
            .await?;
        Ok(models::CustomerWithNotes {
            customer: customer.try_into()?,
            notes,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_customer_status(
        &self,
        customer_id: &str,
        old_status: &str,
        new_status: &str,
    ) -> Result<models::ActionResult, Error> {
        let old_status = i16::from(old_status.parse::<CustomerStatus>()?);
        let new_status = i16::from(new_status.parse::<CustomerStatus>()?);
        let customer_id = customer_id.to_owned();
        let mut conn = self.connection().await?;
        conn.transaction(|conn| {
            use schema::customers;
            async move {
                let affected = diesel::update(customers::table)
                    .filter(
                        customers::id
                            .eq(&customer_id)
                            .and(customers::status.eq(old_status)),
                    )
                    .set(customers::status.eq(new_status))
                    .execute(conn)
                    .await?;
                expect_single_row(
                    affected,
                    Entity::Customer,
                    &customer_id,
                    "updated",
                    "the customer does not exist or its status was changed by another user already",
                )?;
                Ok::<_, Error>(models::ActionResult::new(
                    customer_id,
                    models::ActionStatus::Updated,
                ))
            }
            .scope_boxed()
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn load_note_by_id(&self, note_id: &str) -> Result<models::CustomerNote, Error> {
        use schema::customer_notes;
        let mut conn = self.connection().await?;
        let mut matching = customer_notes::table
            .filter(customer_notes::id.eq(note_id))
            .select(models::CustomerNote::as_select())
            .load(&mut conn)
            .await?;
        match matching.len() {
            1 => Ok(matching.remove(0)),
            0 => Err(Error::NotFound {
                entity: Entity::Note,
                id: note_id.to_owned(),
            }),
            count => Err(Error::MultipleMatches {
                entity: Entity::Note,
                id: note_id.to_owned(),
                count,
            }),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_notes_by_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<models::CustomerNote>, Error> {
        use schema::customer_notes;
        let mut conn = self.connection().await?;
        customer_notes::table
            .filter(customer_notes::customer.eq(customer_id))
            .select(models::CustomerNote::as_select())
            .load(&mut conn)
            .await
            .map_err(Into::into)
    }

    #[tracing::instrument(skip(self, content))]
    pub async fn add_note(
        &self,
        customer_id: &str,
        content: &str,
    ) -> Result<models::ActionResult, Error> {
        let note_id = uuid::Uuid::new_v4().to_string();
        let customer_id = customer_id.to_owned();
        let content = content.to_owned();
        let mut conn = self.connection().await?;
        conn.transaction(|conn| {
            use schema::customer_notes;
            async move {
                ensure_customer_exists(conn, &customer_id).await?;
                diesel::insert_into(customer_notes::table)
                    .values(models::NewCustomerNote {
                        id: &note_id,
                        customer: &customer_id,
                        content: &content,
                    })
                    .execute(conn)
                    .await?;
                tracing::debug!(%note_id, "note created");
                Ok::<_, Error>(models::ActionResult::new(
                    note_id,
                    models::ActionStatus::Created,
                ))
            }
            .scope_boxed()
        })
        .await
    }

    #[tracing::instrument(skip(self, old_content, new_content))]
    pub async fn update_note(
        &self,
        note_id: &str,
        customer_id: &str,
        old_content: &str,
        new_content: &str,
    ) -> Result<models::ActionResult, Error> {
        let note_id = note_id.to_owned();
        let customer_id = customer_id.to_owned();
        let old_content = old_content.to_owned();
        let new_content = new_content.to_owned();
        let mut conn = self.connection().await?;
        conn.transaction(|conn| {
            use schema::customer_notes;
            async move {
                ensure_customer_exists(conn, &customer_id).await?;
                let affected = diesel::update(customer_notes::table)
                    .filter(
                        customer_notes::id
                            .eq(&note_id)
                            .and(customer_notes::customer.eq(&customer_id))
                            .and(customer_notes::content.eq(&old_content)),
                    )
                    .set(customer_notes::content.eq(&new_content))
                    .execute(conn)
                    .await?;
                expect_single_row(
                    affected,
                    Entity::Note,
                    &note_id,
                    "updated",
                    "it was updated by another user already, reassigned or removed",
                )?;
                Ok::<_, Error>(models::ActionResult::new(
                    note_id,
                    models::ActionStatus::Updated,
                ))
            }
            .scope_boxed()
        })
        .await
    }

    /// Removes a note only while its content is still `content`. The customer
    /// may already be gone.
    #[tracing::instrument(skip(self, content))]
    pub async fn delete_note(
        &self,
        note_id: &str,
        customer_id: &str,
        content: &str,
    ) -> Result<models::ActionResult, Error> {
        let note_id = note_id.to_owned();
        let customer_id = customer_id.to_owned();
        let content = content.to_owned();
        let mut conn = self.connection().await?;
        conn.transaction(|conn| {
            use schema::customer_notes;
            async move {
                let affected = diesel::delete(customer_notes::table)
                    .filter(
                        customer_notes::id
                            .eq(&note_id)
                            .and(customer_notes::customer.eq(&customer_id))
                            .and(customer_notes::content.eq(&content)),
                    )
                    .execute(conn)
                    .await?;
                expect_single_row(
                    affected,
                    Entity::Note,
                    &note_id,
                    "deleted",
                    "it was changed by another user already, reassigned or removed",
                )?;
                Ok::<_, Error>(models::ActionResult::new(
                    note_id,
                    models::ActionStatus::Deleted,
                ))
            }
            .scope_boxed()
        })
        .await
    }
}

fn into_records(customers: Vec<models::Customer>) -> Result<Vec<models::CustomerRecord>, Error> {
    customers
        .into_iter()
        .map(|customer| models::CustomerRecord::try_from(customer).map_err(Error::from))
        .collect()
}
