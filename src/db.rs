// Relational store - SQLite schema and batch inserts
//
// Four append-only tables keyed by BIN. Each batch goes in as a single
// transaction: the first failed row (including a primary-key conflict on a
// re-run) rolls the whole batch back. There is no upsert and no
// deduplication.

use anyhow::Result;
use rusqlite::{params, Connection};

use crate::entities::{
    Business, BusinessBankrupt, BusinessInvalidRegistration, BusinessWrongAddress,
};

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS business (
            bin TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            registration_date TEXT NOT NULL,
            oked TEXT NOT NULL,
            additional_oked TEXT NOT NULL,
            krp TEXT NOT NULL,
            kato TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS business_wrong_address (
            bin TEXT PRIMARY KEY,
            rnn TEXT NOT NULL,
            full_name TEXT NOT NULL,
            taxpayer_name TEXT NOT NULL,
            director_name TEXT NOT NULL,
            director_iin TEXT NOT NULL,
            director_rnn TEXT NOT NULL,
            inspection_act_number TEXT NOT NULL,
            inspection_act_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS business_bankrupt (
            bin TEXT PRIMARY KEY,
            rnn TEXT NOT NULL,
            full_name TEXT NOT NULL,
            taxpayer_name TEXT NOT NULL,
            director_name TEXT NOT NULL,
            director_iin TEXT NOT NULL,
            director_rnn TEXT NOT NULL,
            court_decision_number TEXT NOT NULL,
            court_decision_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS business_invalid_registration (
            bin TEXT PRIMARY KEY,
            rnn TEXT NOT NULL,
            full_name TEXT NOT NULL,
            taxpayer_name TEXT NOT NULL,
            director_name TEXT NOT NULL,
            director_iin TEXT NOT NULL,
            director_rnn TEXT NOT NULL,
            court_decision_number TEXT NOT NULL,
            court_decision_date TEXT
        )",
        [],
    )?;

    Ok(())
}

pub fn insert_businesses(conn: &mut Connection, records: &[Business]) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO business (
                bin, full_name, registration_date, oked, additional_oked, krp, kato
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;

        for record in records {
            stmt.execute(params![
                record.bin,
                record.full_name,
                record.registration_date.to_string(),
                record.oked,
                record.additional_oked,
                record.krp,
                record.kato,
            ])?;
        }
    }
    tx.commit()?;

    Ok(records.len())
}

pub fn insert_wrong_address(
    conn: &mut Connection,
    records: &[BusinessWrongAddress],
) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO business_wrong_address (
                bin, rnn, full_name, taxpayer_name, director_name,
                director_iin, director_rnn, inspection_act_number, inspection_act_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        for record in records {
            stmt.execute(params![
                record.bin,
                record.rnn,
                record.full_name,
                record.taxpayer_name,
                record.director_name,
                record.director_iin,
                record.director_rnn,
                record.inspection_act_number,
                record.inspection_act_date.map(|d| d.to_string()),
            ])?;
        }
    }
    tx.commit()?;

    Ok(records.len())
}

pub fn insert_bankrupt(conn: &mut Connection, records: &[BusinessBankrupt]) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO business_bankrupt (
                bin, rnn, full_name, taxpayer_name, director_name,
                director_iin, director_rnn, court_decision_number, court_decision_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        for record in records {
            stmt.execute(params![
                record.bin,
                record.rnn,
                record.full_name,
                record.taxpayer_name,
                record.director_name,
                record.director_iin,
                record.director_rnn,
                record.court_decision_number,
                record.court_decision_date.map(|d| d.to_string()),
            ])?;
        }
    }
    tx.commit()?;

    Ok(records.len())
}

pub fn insert_invalid_registration(
    conn: &mut Connection,
    records: &[BusinessInvalidRegistration],
) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO business_invalid_registration (
                bin, rnn, full_name, taxpayer_name, director_name,
                director_iin, director_rnn, court_decision_number, court_decision_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        for record in records {
            stmt.execute(params![
                record.bin,
                record.rnn,
                record.full_name,
                record.taxpayer_name,
                record.director_name,
                record.director_iin,
                record.director_rnn,
                record.court_decision_number,
                record.court_decision_date.map(|d| d.to_string()),
            ])?;
        }
    }
    tx.commit()?;

    Ok(records.len())
}

/// Post-import verification count.
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;

    Ok(count)
}
