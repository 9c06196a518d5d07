//! [`Command`] for updating a market value of a [`Sheep`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{sheep, Sheep},
    error::{self, Classify},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a market value of a [`Sheep`].
///
/// Affects estimates of active contracts only, settled ones keep their frozen
/// figures.
#[derive(Clone, Copy, Debug)]
pub struct UpdateSheepMarketValue {
    /// ID of the [`Sheep`] to be updated.
    pub sheep_id: sheep::Id,

    /// New market value of the [`Sheep`], or [`None`] to clear it.
    pub market_value: Option<Money>,
}

impl<Db> Command<UpdateSheepMarketValue> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Sheep, sheep::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Sheep>, sheep::Id>>,
            Ok = Option<Sheep>,
            Err = Traced<database::Error>,
        > + Database<Update<Sheep>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Sheep;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateSheepMarketValue,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateSheepMarketValue {
            sheep_id,
            market_value,
        } = cmd;

        if let Some(value) = market_value.filter(Money::is_negative) {
            return Err(tracerr::new!(E::NegativeMarketValue(value)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(sheep_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut sheep = tx
            .execute(Select(By::<Option<Sheep>, _>::new(sheep_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SheepNotExists(sheep_id))
            .map_err(tracerr::wrap!())?;

        sheep.market_value = market_value;

        tx.execute(Update(sheep.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Sheep(id: {sheep_id})` market value updated to {}",
            market_value.map_or_else(|| "none".to_owned(), |v| v.to_string()),
        );
        Ok(sheep)
    }
}

/// Error of [`UpdateSheepMarketValue`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided market value is negative.
    #[display("market value `{_0}` is negative")]
    NegativeMarketValue(#[error(not(source))] Money),

    /// [`Sheep`] with the provided ID does not exist.
    #[display("`Sheep(id: {_0})` does not exist")]
    SheepNotExists(#[error(not(source))] sheep::Id),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::NegativeMarketValue(_) => error::Kind::Validation,
            Self::SheepNotExists(_) => error::Kind::NotFound,
        }
    }
}
