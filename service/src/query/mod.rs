//! [`Query`] definition.

pub mod contract;
pub mod contract_summary;
pub mod investor;
pub mod sheep;

use std::fmt;

use common::operations::{By, Select};
use tracerr::Traced;
use tracing as log;

use crate::{
    error::Classify,
    infra::{database, Database},
    Service,
};

pub use self::contract_summary::ContractSummary;

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] re-executing the wrapped one while it fails transiently.
///
/// Attempts are bounded by the [`RetryPolicy`] of the [`Service`] and
/// separated by a linearly growing backoff.
///
/// [`RetryPolicy`]: crate::RetryPolicy
#[derive(Clone, Copy, Debug)]
pub struct Retrying<Q>(pub Q);

impl<Db, Q> Query<Retrying<Q>> for Service<Db>
where
    Self: Query<Q, Err: Classify + fmt::Display>,
    Q: Clone,
{
    type Ok = <Self as Query<Q>>::Ok;
    type Err = <Self as Query<Q>>::Err;

    async fn execute(
        &self,
        Retrying(query): Retrying<Q>,
    ) -> Result<Self::Ok, Self::Err> {
        let policy = self.config().read_retry;
        let mut attempt = 1;
        loop {
            match self.execute(query.clone()).await {
                Err(e) if e.is_transient() && attempt < policy.attempts => {
                    log::warn!(
                        "transient failure on attempt {attempt}/{}, \
                         retrying: {e}",
                        policy.attempts,
                    );
                    tokio::time::sleep(policy.backoff * attempt).await;
                    attempt += 1;
                }
                res => return res,
            }
        }
    }
}
