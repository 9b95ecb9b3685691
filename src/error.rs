use thiserror::Error;

/// Errors raised while building brackets, simulating pools or aggregating results.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid standings: {0}")]
    InvalidStandings(String),

    #[error("invalid bracket: {0}")]
    InvalidBracket(String),

    #[error("unknown round: {0:?}")]
    UnknownRound(String),

    #[error("pool has no entries")]
    EmptyPool,

    #[error("number of trials must be positive")]
    InvalidTrials,

    #[error("pool {pool_id} failed: {source}")]
    Collaborator {
        pool_id: usize,
        #[source]
        source: Box<SimError>,
    },

    #[error("pool {pool_id}: winning entry {name:?} not found among entries")]
    WinnerNotFound { pool_id: usize, name: String },
}

impl SimError {
    /// Wrap an error raised inside the simulation of one pool.
    pub fn in_pool(self, pool_id: usize) -> Self {
        match self {
            err @ (SimError::Collaborator { .. } | SimError::WinnerNotFound { .. }) => err,
            other => SimError::Collaborator {
                pool_id,
                source: Box::new(other),
            },
        }
    }

    /// Index of the pool that produced this error, if any.
    pub fn pool_id(&self) -> Option<usize> {
        match self {
            SimError::Collaborator { pool_id, .. } | SimError::WinnerNotFound { pool_id, .. } => {
                Some(*pool_id)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
