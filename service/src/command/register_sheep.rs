//! [`Command`] for registering a [`Sheep`] on the farm.

use common::{operations::Insert, DateTime, Money};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{sheep, Sheep},
    error::{self, Classify},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Sheep`] in stock.
#[derive(Clone, Debug)]
pub struct RegisterSheep {
    /// Ear [`sheep::Tag`] of the new [`Sheep`].
    pub tag: sheep::Tag,

    /// [`sheep::Health`] of the new [`Sheep`].
    pub health: sheep::Health,

    /// Assessed market value of the new [`Sheep`], if any.
    pub market_value: Option<Money>,
}

impl<Db> Command<RegisterSheep> for Service<Db>
where
    Db: Database<Insert<Sheep>, Err = Traced<database::Error>>,
{
    type Ok = Sheep;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RegisterSheep) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterSheep {
            tag,
            health,
            market_value,
        } = cmd;

        if let Some(value) = market_value.filter(Money::is_negative) {
            return Err(tracerr::new!(E::NegativeMarketValue(value)));
        }

        let sheep = Sheep {
            id: sheep::Id::new(),
            tag,
            health,
            status: sheep::Status::InStock,
            market_value,
            created_at: DateTime::now().coerce(),
        };

        let res = self.database().execute(Insert(sheep.clone())).await;
        if let Err(e) = &res {
            if e.as_ref().is_unique_violation(Some(constraint::SHEEP_TAG)) {
                log::warn!("`Sheep(tag: {})` is registered already", sheep.tag);
                return Err(tracerr::new!(E::TagOccupied(sheep.tag)));
            }
        }
        res.map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!("`Sheep(id: {}, tag: {})` registered", sheep.id, sheep.tag);
        Ok(sheep)
    }
}

/// Error of [`RegisterSheep`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided market value is negative.
    #[display("market value `{_0}` is negative")]
    NegativeMarketValue(#[error(not(source))] Money),

    /// [`sheep::Tag`] is used by another [`Sheep`] already.
    #[display("`Sheep(tag: {_0})` exists already")]
    TagOccupied(#[error(not(source))] sheep::Tag),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::NegativeMarketValue(_) => error::Kind::Validation,
            Self::TagOccupied(_) => error::Kind::Conflict,
        }
    }
}
