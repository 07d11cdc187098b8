use std::cmp::min;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

use crate::error::ContractError;

#[cw_serde]
pub struct DepositRecord {
    /// Locked quantity, fixed at creation
    pub amount: Uint128,
    /// Portion already paid out, never above `amount`
    pub withdrawn_amount: Uint128,
    /// Unix seconds from which the record can be withdrawn
    pub unlock_time: u64,
}

impl DepositRecord {
    pub fn remaining(&self) -> Uint128 {
        self.amount.saturating_sub(self.withdrawn_amount)
    }

    pub fn is_unlocked(&self, now: u64) -> bool {
        self.unlock_time <= now
    }
}

/// Every lock credited to one address, oldest first.
///
/// `cursor` points at the oldest record that still holds a balance; all
/// records before it are fully withdrawn and are kept only as history.
#[cw_serde]
#[derive(Default)]
pub struct DepositAccount {
    records: Vec<DepositRecord>,
    cursor: u32,
}

impl DepositAccount {
    pub fn records(&self) -> &[DepositRecord] {
        &self.records
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn append(&mut self, amount: Uint128, unlock_time: u64) {
        self.records.push(DepositRecord {
            amount,
            withdrawn_amount: Uint128::zero(),
            unlock_time,
        });
    }

    fn open_records(&self) -> impl Iterator<Item = &DepositRecord> {
        self.records.iter().skip(self.cursor as usize)
    }

    /// Total still owed to this address, locked or not.
    pub fn balance(&self) -> Uint128 {
        self.open_records()
            .fold(Uint128::zero(), |total, record| total + record.remaining())
    }

    /// Portion of the balance whose lock has expired at `now`.
    pub fn withdrawable(&self, now: u64) -> Uint128 {
        self.open_records()
            .filter(|record| record.is_unlocked(now))
            .fold(Uint128::zero(), |total, record| total + record.remaining())
    }

    /// Pays `amount` out of unlocked records, oldest first. Either the whole
    /// amount is debited or nothing is.
    pub fn debit_fifo(&mut self, amount: Uint128, now: u64) -> Result<(), ContractError> {
        let available = self.withdrawable(now);
        if available < amount {
            return Err(ContractError::InsufficientWithdrawable {
                requested: amount,
                available,
            });
        }

        let mut needed = amount;
        for record in self.records.iter_mut().skip(self.cursor as usize) {
            if needed.is_zero() {
                break;
            }
            if !record.is_unlocked(now) {
                continue;
            }
            let debit = min(record.remaining(), needed);
            record.withdrawn_amount += debit;
            needed -= debit;
        }

        while let Some(record) = self.records.get(self.cursor as usize) {
            if !record.remaining().is_zero() {
                break;
            }
            self.cursor += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(records: &[(u128, u64)]) -> DepositAccount {
        let mut account = DepositAccount::default();
        for (amount, unlock_time) in records {
            account.append(Uint128::new(*amount), *unlock_time);
        }
        account
    }

    #[test]
    fn balance_counts_locked_funds() {
        let account = account(&[(100, 10), (50, 20)]);
        assert_eq!(Uint128::new(150), account.balance());
        assert_eq!(Uint128::zero(), account.withdrawable(9));
        assert_eq!(Uint128::new(100), account.withdrawable(10));
        assert_eq!(Uint128::new(150), account.withdrawable(20));
    }

    #[test]
    fn debit_takes_oldest_first() {
        let mut account = account(&[(100, 10), (50, 10)]);
        account.debit_fifo(Uint128::new(30), 10).unwrap();

        let records = account.records();
        assert_eq!(Uint128::new(30), records[0].withdrawn_amount);
        assert_eq!(Uint128::zero(), records[1].withdrawn_amount);
        assert_eq!(0, account.cursor());
        assert_eq!(Uint128::new(120), account.balance());
    }

    #[test]
    fn debit_spans_records_and_moves_cursor() {
        let mut account = account(&[(100, 10), (50, 10), (25, 10)]);
        account.debit_fifo(Uint128::new(120), 11).unwrap();

        let records = account.records();
        assert_eq!(Uint128::new(100), records[0].withdrawn_amount);
        assert_eq!(Uint128::new(20), records[1].withdrawn_amount);
        assert_eq!(Uint128::zero(), records[2].withdrawn_amount);
        assert_eq!(1, account.cursor());

        account.debit_fifo(Uint128::new(55), 11).unwrap();
        assert_eq!(3, account.cursor());
        assert_eq!(Uint128::zero(), account.balance());
        // fully withdrawn records stay as history
        assert_eq!(3, account.records().len());
    }

    #[test]
    fn debit_skips_locked_records() {
        let mut account = account(&[(100, 50), (40, 10)]);
        account.debit_fifo(Uint128::new(40), 20).unwrap();

        let records = account.records();
        assert_eq!(Uint128::zero(), records[0].withdrawn_amount);
        assert_eq!(Uint128::new(40), records[1].withdrawn_amount);
        assert_eq!(0, account.cursor());
    }

    #[test]
    fn insufficient_debit_changes_nothing() {
        let mut account = account(&[(100, 10), (50, 30)]);
        let before = account.clone();

        let err = account.debit_fifo(Uint128::new(120), 20).unwrap_err();
        assert_eq!(
            ContractError::InsufficientWithdrawable {
                requested: Uint128::new(120),
                available: Uint128::new(100),
            },
            err
        );
        assert_eq!(before, account);
    }

    #[test]
    fn withdrawable_is_stable_between_calls() {
        let account = account(&[(100, 10), (50, 30)]);
        assert_eq!(account.withdrawable(25), account.withdrawable(25));
        assert!(account.withdrawable(25) <= account.balance());
    }
}
