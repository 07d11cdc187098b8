use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

use crate::error::ContractError;

/// Length of one supply checkpoint window, in seconds.
pub const EPOCH_DURATION: u64 = 7 * 86_400;
/// How long every deposit stays locked, in seconds.
pub const LOCK_DURATION: u64 = 16 * EPOCH_DURATION;

/// Start of the epoch window containing `time`.
pub fn epoch_start(time: u64) -> u64 {
    time / EPOCH_DURATION * EPOCH_DURATION
}

#[cw_serde]
#[derive(Copy)]
pub struct Epoch {
    /// Locked supply recorded for this window
    pub supply: Uint128,
    /// Window start, aligned to `EPOCH_DURATION`
    pub date: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SupplyDelta {
    Increase(Uint128),
    Decrease(Uint128),
}

/// Dense, append-only history of weekly supply checkpoints.
///
/// Index 0 is the genesis epoch. Consecutive entries are exactly one
/// `EPOCH_DURATION` apart; entries are only ever appended, and only the
/// latest one is adjusted in place.
#[cw_serde]
pub struct EpochTimeline {
    epochs: Vec<Epoch>,
}

impl EpochTimeline {
    pub fn new(genesis_time: u64) -> Self {
        EpochTimeline {
            epochs: vec![Epoch {
                supply: Uint128::zero(),
                date: epoch_start(genesis_time),
            }],
        }
    }

    pub fn len(&self) -> u32 {
        self.epochs.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn get(&self, index: u32) -> Result<&Epoch, ContractError> {
        self.epochs
            .get(index as usize)
            .ok_or(ContractError::OutOfRange {
                index,
                count: self.len(),
            })
    }

    pub fn total_supply_at(&self, index: u32) -> Result<Uint128, ContractError> {
        self.get(index).map(|epoch| epoch.supply)
    }

    pub fn latest_index(&self) -> u32 {
        self.len().saturating_sub(1)
    }

    pub fn latest(&self) -> Option<&Epoch> {
        self.epochs.last()
    }

    /// Backfills one epoch per window elapsed between the latest entry and
    /// `now`, each carrying the previous supply forward. Returns how many
    /// epochs were appended.
    pub fn advance_to(&mut self, now: u64) -> u32 {
        let mut appended = 0;
        while let Some(last) = self.epochs.last().copied() {
            if now.saturating_sub(last.date) < EPOCH_DURATION {
                break;
            }
            self.epochs.push(Epoch {
                supply: last.supply,
                date: last.date + EPOCH_DURATION,
            });
            appended += 1;
        }
        appended
    }

    /// Adjusts the latest epoch in place and returns its index.
    pub fn apply(&mut self, delta: SupplyDelta) -> Result<u32, ContractError> {
        let index = self.latest_index();
        let count = self.len();
        let latest = self
            .epochs
            .last_mut()
            .ok_or(ContractError::OutOfRange { index, count })?;
        latest.supply = match delta {
            SupplyDelta::Increase(amount) => latest.supply.checked_add(amount)?,
            SupplyDelta::Decrease(amount) => latest.supply.checked_sub(amount)?,
        };
        Ok(index)
    }

    /// Index of the recorded epoch whose window contains `time`.
    pub fn index_at(&self, time: u64) -> Option<u32> {
        let genesis = self.epochs.first()?;
        if time < genesis.date {
            return None;
        }
        let index = (time - genesis.date) / EPOCH_DURATION;
        if index < self.epochs.len() as u64 {
            Some(index as u32)
        } else {
            None
        }
    }

    /// Epochs after `start_after` (or from genesis), at most `limit` of them.
    pub fn range(&self, start_after: Option<u32>, limit: usize) -> Vec<(u32, Epoch)> {
        let start = start_after.map(|i| (i as usize).saturating_add(1)).unwrap_or(0);
        self.epochs
            .iter()
            .enumerate()
            .skip(start)
            .take(limit)
            .map(|(i, epoch)| (i as u32, *epoch))
            .collect()
    }
}
