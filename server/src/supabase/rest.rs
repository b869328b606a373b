use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::{parse_json, Supabase, SupabaseError, SupabaseResult};

/// A PostgREST read, built up like `from("profiles").select("*").eq("id", id)`
pub struct QueryBuilder<'a> {
    supabase: &'a Supabase,
    table: String,
    select: String,
    filters: Vec<(String, String)>,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(supabase: &'a Supabase, table: &str) -> Self {
        Self {
            supabase,
            table: table.to_string(),
            select: "*".to_string(),
            filters: vec![],
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.chars().filter(|c| !c.is_whitespace()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![("select".to_string(), self.select.clone())];
        query.extend(self.filters.iter().cloned());
        query
    }

    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn execute<T: DeserializeOwned>(self) -> SupabaseResult<Vec<T>> {
        let bearer = self.supabase.bearer().await?;

        let response = self
            .supabase
            .client()
            .request(Method::GET, &format!("/rest/v1/{}", self.table))
            .bearer_auth(bearer)
            .query(&self.query())
            .send()
            .await?;

        Ok(parse_json::<Option<Vec<T>>>(response)
            .await?
            .unwrap_or_default())
    }

    /// `None` for zero rows, an error for more than one
    pub async fn maybe_single<T: DeserializeOwned>(self) -> SupabaseResult<Option<T>> {
        let mut rows = self.execute::<T>().await?;

        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(SupabaseError::Api {
                status: 406,
                code: Some("PGRST116".to_string()),
                message: format!("JSON object requested, multiple ({n}) rows returned"),
            }),
        }
    }
}

impl Supabase {
    /// Call a database function through `POST /rest/v1/rpc/<function>`
    #[instrument(skip(self, args))]
    pub async fn rpc(&self, function: &str, args: &impl Serialize) -> SupabaseResult<Value> {
        let bearer = self.bearer().await?;

        let response = self
            .client()
            .request(Method::POST, &format!("/rest/v1/rpc/{function}"))
            .bearer_auth(bearer)
            .json(args)
            .send()
            .await?;

        parse_json(response).await
    }
}
