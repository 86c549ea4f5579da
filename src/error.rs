//! Typed failures at the engine's boundaries. The engine itself clamps instead of
//! failing; these only come out of definition loading, stores and the service.

use thiserror::Error;

use crate::model::{ActivityId, PlayerId, SkillId, UpgradeId};

/// Problems found while validating raw definitions into a catalog.
#[derive(Debug, Error, PartialEq)]
pub enum DefinitionError {
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("energy skill {0} is not defined")]
    MissingEnergySkill(SkillId),

    #[error("{owner} references unknown currency `{name}`")]
    UnknownCurrency { owner: String, name: String },

    #[error("{owner} references unknown skill `{name}`")]
    UnknownSkill { owner: String, name: String },

    #[error("{owner} has unknown stat key `{key}`")]
    UnknownStat { owner: String, key: String },

    #[error("{owner} has malformed unlock condition `{condition}`")]
    MalformedCondition { owner: String, condition: String },

    #[error("{owner}: {field} must be positive, got {value}")]
    NonPositive {
        owner: String,
        field: &'static str,
        value: f64,
    },

    #[error("{owner}: max_purchases must be at least 1")]
    ZeroMaxPurchases { owner: String },
}

/// Errors surfaced by player stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("player store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

/// Errors surfaced by [`crate::GameService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("player {0} is not registered")]
    UnknownPlayer(PlayerId),

    #[error("player {0} is already registered")]
    AlreadyRegistered(PlayerId),

    #[error("{0} is not defined")]
    UnknownActivity(ActivityId),

    #[error("{0} is not unlocked for this player")]
    ActivityLocked(ActivityId),

    #[error("{0} is not defined")]
    UnknownUpgrade(UpgradeId),

    #[error("player lock was poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
