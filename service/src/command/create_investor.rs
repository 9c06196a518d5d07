//! [`Command`] for creating an [`Investor`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{investor, Investor},
    error::{self, Classify},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Investor`].
#[derive(Clone, Debug)]
pub struct CreateInvestor {
    /// [`investor::Name`] of the new [`Investor`].
    pub name: investor::Name,
}

impl<Db> Command<CreateInvestor> for Service<Db>
where
    Db: Database<Insert<Investor>, Err = Traced<database::Error>>,
{
    type Ok = Investor;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateInvestor) -> Result<Self::Ok, Self::Err> {
        let CreateInvestor { name } = cmd;

        let investor = Investor {
            id: investor::Id::new(),
            name,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(investor.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
            .map(drop)?;

        log::info!("`Investor(id: {})` created", investor.id);
        Ok(investor)
    }
}

/// Error of [`CreateInvestor`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::Db(e) => e.kind(),
        }
    }
}
