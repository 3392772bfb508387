use crate::status::{self, CustomerStatus};
use diesel::prelude::*;

#[derive(Identifiable, Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Customer {
    pub id: String,
    pub status: i16,
    pub creation: jiff_diesel::Timestamp,
    pub name: String,
    pub email: String,
    pub landline: String,
    pub mobile: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

/// Customers are created outside this service, only the store tests insert them
#[cfg(test)]
#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NewCustomer {
    pub id: String,
    pub status: i16,
    pub creation: jiff_diesel::Timestamp,
    pub name: String,
    pub email: String,
    pub landline: String,
    pub mobile: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Identifiable, Queryable, Selectable, Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[diesel(table_name = crate::schema::customer_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerNote {
    pub id: String,
    pub customer: String,
    pub content: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customer_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCustomerNote<'a> {
    pub id: &'a str,
    pub customer: &'a str,
    pub content: &'a str,
}

/// A customer as handed out to callers - the status in its named form
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CustomerRecord {
    pub id: String,
    pub status: CustomerStatus,
    pub creation: jiff::Timestamp,
    pub name: String,
    pub email: String,
    pub landline: String,
    pub mobile: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl TryFrom<Customer> for CustomerRecord {
    type Error = status::Error;

    fn try_from(
        Customer {
            id,
            status,
            creation,
            name,
            email,
            landline,
            mobile,
            address,
            city,
            zip_code,
            country,
        }: Customer,
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            status: status.try_into()?,
            creation: creation.to_jiff(),
            name,
            email,
            landline,
            mobile,
            address,
            city,
            zip_code,
            country,
        })
    }
}

/// A customer together with every note recorded against it
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CustomerWithNotes {
    #[serde(flatten)]
    pub customer: CustomerRecord,
    pub notes: Vec<CustomerNote>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Created,
    Updated,
    Deleted,
}

/// Outcome of a successful guarded write
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ActionResult {
    pub id: String,
    pub status: ActionStatus,
}

impl ActionResult {
    pub(crate) fn new(id: impl Into<String>, status: ActionStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}
