//! Execution seam between the session loop and the query engine.

use meridian_link::{LinkClient, QueryOutcome};

use crate::error::Result;

/// The embedded query engine as the shell consumes it: one complete
/// statement in, rows and a trailing message out.
#[allow(async_fn_in_trait)]
pub trait StatementExecutor {
    async fn execute(&self, statement: &str) -> Result<QueryOutcome>;
}

/// Executes statements against a Meridian server through [`LinkClient`].
pub struct LinkExecutor {
    client: LinkClient,
}

impl LinkExecutor {
    pub fn new(client: LinkClient) -> Self {
        Self { client }
    }
}

impl StatementExecutor for LinkExecutor {
    async fn execute(&self, statement: &str) -> Result<QueryOutcome> {
        Ok(self.client.execute_statement(statement).await?)
    }
}
