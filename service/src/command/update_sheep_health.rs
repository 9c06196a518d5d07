//! [`Command`] for updating health of a [`Sheep`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
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

/// [`Command`] for updating [`sheep::Health`] of a [`Sheep`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateSheepHealth {
    /// ID of the [`Sheep`] to be updated.
    pub sheep_id: sheep::Id,

    /// New [`sheep::Health`] of the [`Sheep`].
    pub health: sheep::Health,
}

impl<Db> Command<UpdateSheepHealth> for Service<Db>
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
        cmd: UpdateSheepHealth,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateSheepHealth { sheep_id, health } = cmd;

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

        sheep.health = health;

        tx.execute(Update(sheep.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Sheep(id: {sheep_id})` is {health} now");
        Ok(sheep)
    }
}

/// Error of [`UpdateSheepHealth`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Sheep`] with the provided ID does not exist.
    #[display("`Sheep(id: {_0})` does not exist")]
    SheepNotExists(#[error(not(source))] sheep::Id),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::SheepNotExists(_) => error::Kind::NotFound,
        }
    }
}
