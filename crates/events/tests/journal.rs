//! Journal persistence tests: append, reopen, replay, tamper detection

use coffer_core::{AccountId, Amount, TxId};
use coffer_events::{verify_chain, AccountEvent, ChainError, EventReader, EventStore};
use tempfile::TempDir;

fn id(s: &str) -> AccountId {
    s.parse().unwrap()
}

fn opened() -> AccountEvent {
    AccountEvent::AccountOpened {
        account: id("chk-test"),
        owner: id("creator"),
        level: 1,
    }
}

#[test]
fn test_append_and_read_back() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let mut store = EventStore::open(dir.path())?;
    assert_eq!(store.last_sequence(), 0);

    let first = store.append(opened())?;
    let second = store.append(AccountEvent::Deposited {
        from: id("creator"),
        amount: Amount::from_units(1000),
    })?;

    assert!(first.is_genesis());
    assert_eq!(second.sequence, 2);
    assert_eq!(second.prev_hash, first.hash);

    let records = EventReader::from_directory(dir.path())?.read_all()?;
    assert_eq!(records, vec![first, second]);
    verify_chain(&records)?;
    Ok(())
}

#[test]
fn test_reopen_resumes_chain() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    {
        let mut store = EventStore::open(dir.path())?;
        store.append(opened())?;
    }

    let mut store = EventStore::open(dir.path())?;
    assert_eq!(store.last_sequence(), 1);

    let record = store.append(AccountEvent::WithdrawalDeleted {
        id: TxId(0),
        by: id("creator"),
    })?;
    assert_eq!(record.sequence, 2);

    let records = EventReader::from_directory(dir.path())?.read_all()?;
    assert_eq!(records.len(), 2);
    verify_chain(&records)?;
    Ok(())
}

#[test]
fn test_tampered_file_fails_verification() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    {
        let mut store = EventStore::open(dir.path())?;
        store.append(opened())?;
        store.append(AccountEvent::Deposited {
            from: id("creator"),
            amount: Amount::from_units(10),
        })?;
    }

    let reader = EventReader::from_directory(dir.path())?;
    let file = reader.files()[0].clone();
    let content = std::fs::read_to_string(&file)?;
    std::fs::write(&file, content.replace("\"10\"", "\"10000\""))?;

    let records = EventReader::from_directory(dir.path())?.read_all()?;
    let result = verify_chain(&records);
    assert!(matches!(result, Err(ChainError::InvalidHash { sequence: 2, .. })));
    Ok(())
}

#[test]
fn test_missing_directory_reads_empty() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let reader = EventReader::from_directory(dir.path().join("absent"))?;
    assert!(reader.read_all()?.is_empty());
    assert!(reader.last_record()?.is_none());
    Ok(())
}
