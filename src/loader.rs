// Batch loaders - workbook to record batch to destination stores
//
// Every loader materializes its whole workbook in memory before any write:
// decode first, collect every row-level error, and only touch the stores
// once the batch is clean. The taxpayer lists write to the document store
// first and the relational table second, with no compensating rollback if
// the second write fails.

use anyhow::{anyhow, bail, Result};
use mongodb::bson::Document;
use mongodb::Database;
use rusqlite::Connection;
use std::path::Path;
use umya_spreadsheet::Worksheet;

use crate::db;
use crate::documents;
use crate::entities::{
    Business, BusinessBankrupt, BusinessInvalidRegistration, BusinessWrongAddress,
};
use crate::xlsx::{self, RowError, SheetTable};

// Fixed source file names for the taxpayer lists
pub const WRONG_ADDRESS_FILE: &str = "list_WRONG_ADDRESS_KZ_ALL.xlsx";
pub const BANKRUPT_FILE: &str = "list_BANKRUPT_KZ_ALL.xlsx";
pub const INVALID_REGISTRATION_FILE: &str = "list_INVALID_REGISTRATION_KZ_ALL.xlsx";

// Header rows (1-based): the business export carries one banner row above
// its header, the taxpayer lists carry two.
const BUSINESS_HEADER_ROW: u32 = 2;
const LIST_HEADER_ROW: u32 = 3;

// Business export columns
const COL_BIN: &str = "БИН";
const COL_FULL_NAME: &str = "Полное наименование";
const COL_REGISTRATION_DATE: &str = "Дата регистрации";
const COL_OKED: &str = "ОКЭД";
const COL_ADDITIONAL_OKED: &str = "Втор.ОКЭД";
const COL_KRP: &str = "КРП";
const COL_KATO: &str = "КАТО";

// Taxpayer-list columns, bilingual Kazakh/Russian headers with embedded
// newlines exactly as the exports ship them
const COL_LIST_BIN: &str = "ЖСН/БСН\nИИН/БИН";
const COL_LIST_RNN: &str = "СТН\nРНН";
const COL_LIST_FULL_NAME: &str = "Салық төлеушінің атауы\nНаименование  налогоплательщика";
const COL_LIST_TAXPAYER_NAME: &str = "Салық төлеушінің аты-жөні\nФИО налогоплательщика";
const COL_LIST_DIRECTOR_NAME: &str = "Басшысының аты-жөні\nФИО руководителя";
const COL_LIST_DIRECTOR_IIN: &str = "Басшысының ЖСН \nИИН руководителя";
const COL_LIST_DIRECTOR_RNN: &str = "Басшысының СТН\nРНН руководителя";
const COL_INSPECTION_NUMBER: &str = "Тексеру актінің нөмірі\nНомер акта обследования";
const COL_INSPECTION_DATE: &str = "Тексеру актінің күні\nДата акта обследования";
const COL_COURT_NUMBER: &str = "Сот шешімінің нөмірі\nНомер решения суда";
const COL_COURT_DATE: &str = "Сот шешімінің күні\nДата решения суда";

fn first_sheet<'a>(book: &'a umya_spreadsheet::Spreadsheet, path: &Path) -> Result<&'a Worksheet> {
    book.get_sheet(&0)
        .ok_or_else(|| anyhow!("workbook {:?} has no sheets", path))
}

fn fail_on_row_errors(path: &Path, errors: Vec<RowError>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ");
    bail!(
        "{} row(s) of {:?} failed validation:\n  {}",
        errors.len(),
        path,
        details
    )
}

/// Decode the business export. Rows with a blank BIN are skipped; every
/// failing row is collected before the batch is rejected.
pub fn decode_businesses(path: &Path) -> Result<Vec<Business>> {
    let book = xlsx::open_workbook(path)?;
    let table = SheetTable::new(first_sheet(&book, path)?, BUSINESS_HEADER_ROW)?;

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for row in table.data_rows() {
        let bin = match xlsx::normalize_bin(&table.text(row, COL_BIN)?) {
            Some(bin) => bin,
            None => continue,
        };

        let date_text = table.text(row, COL_REGISTRATION_DATE)?;
        let registration_date = match xlsx::parse_date_cell(&date_text) {
            Ok(date) => date,
            Err(e) => {
                errors.push(RowError {
                    row,
                    column: COL_REGISTRATION_DATE.to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let additional_oked = table.text(row, COL_ADDITIONAL_OKED)?;

        records.push(Business {
            bin,
            full_name: table.text(row, COL_FULL_NAME)?,
            registration_date,
            oked: table.text(row, COL_OKED)?,
            additional_oked: if xlsx::is_blank(&additional_oked) {
                String::new()
            } else {
                additional_oked
            },
            krp: table.text(row, COL_KRP)?,
            kato: table.text(row, COL_KATO)?,
        });
    }

    fail_on_row_errors(path, errors)?;
    Ok(records)
}

/// Decode the wrong-address taxpayer list.
pub fn decode_wrong_address(path: &Path) -> Result<Vec<BusinessWrongAddress>> {
    let book = xlsx::open_workbook(path)?;
    let table = SheetTable::new(first_sheet(&book, path)?, LIST_HEADER_ROW)?;

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for row in table.data_rows() {
        let bin = table.text(row, COL_LIST_BIN)?;
        if xlsx::is_blank(&bin) {
            continue;
        }

        let date_text = table.text(row, COL_INSPECTION_DATE)?;
        let inspection_act_date = match xlsx::parse_optional_date(&date_text) {
            Ok(date) => date,
            Err(e) => {
                errors.push(RowError {
                    row,
                    column: COL_INSPECTION_DATE.to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        records.push(BusinessWrongAddress {
            bin,
            rnn: table.text(row, COL_LIST_RNN)?,
            full_name: table.text(row, COL_LIST_FULL_NAME)?,
            taxpayer_name: table.text(row, COL_LIST_TAXPAYER_NAME)?,
            director_name: table.text(row, COL_LIST_DIRECTOR_NAME)?,
            director_iin: table.text(row, COL_LIST_DIRECTOR_IIN)?,
            director_rnn: table.text(row, COL_LIST_DIRECTOR_RNN)?,
            inspection_act_number: table.text(row, COL_INSPECTION_NUMBER)?,
            inspection_act_date,
        });
    }

    fail_on_row_errors(path, errors)?;
    Ok(records)
}

/// Decode the bankrupt taxpayer list.
pub fn decode_bankrupt(path: &Path) -> Result<Vec<BusinessBankrupt>> {
    let book = xlsx::open_workbook(path)?;
    let table = SheetTable::new(first_sheet(&book, path)?, LIST_HEADER_ROW)?;

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for row in table.data_rows() {
        let bin = table.text(row, COL_LIST_BIN)?;
        if xlsx::is_blank(&bin) {
            continue;
        }

        let date_text = table.text(row, COL_COURT_DATE)?;
        let court_decision_date = match xlsx::parse_optional_date(&date_text) {
            Ok(date) => date,
            Err(e) => {
                errors.push(RowError {
                    row,
                    column: COL_COURT_DATE.to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        records.push(BusinessBankrupt {
            bin,
            rnn: table.text(row, COL_LIST_RNN)?,
            full_name: table.text(row, COL_LIST_FULL_NAME)?,
            taxpayer_name: table.text(row, COL_LIST_TAXPAYER_NAME)?,
            director_name: table.text(row, COL_LIST_DIRECTOR_NAME)?,
            director_iin: table.text(row, COL_LIST_DIRECTOR_IIN)?,
            director_rnn: table.text(row, COL_LIST_DIRECTOR_RNN)?,
            court_decision_number: table.text(row, COL_COURT_NUMBER)?,
            court_decision_date,
        });
    }

    fail_on_row_errors(path, errors)?;
    Ok(records)
}

/// Decode the invalid-registration taxpayer list.
pub fn decode_invalid_registration(path: &Path) -> Result<Vec<BusinessInvalidRegistration>> {
    let book = xlsx::open_workbook(path)?;
    let table = SheetTable::new(first_sheet(&book, path)?, LIST_HEADER_ROW)?;

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for row in table.data_rows() {
        let bin = table.text(row, COL_LIST_BIN)?;
        if xlsx::is_blank(&bin) {
            continue;
        }

        let date_text = table.text(row, COL_COURT_DATE)?;
        let court_decision_date = match xlsx::parse_optional_date(&date_text) {
            Ok(date) => date,
            Err(e) => {
                errors.push(RowError {
                    row,
                    column: COL_COURT_DATE.to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        records.push(BusinessInvalidRegistration {
            bin,
            rnn: table.text(row, COL_LIST_RNN)?,
            full_name: table.text(row, COL_LIST_FULL_NAME)?,
            taxpayer_name: table.text(row, COL_LIST_TAXPAYER_NAME)?,
            director_name: table.text(row, COL_LIST_DIRECTOR_NAME)?,
            director_iin: table.text(row, COL_LIST_DIRECTOR_IIN)?,
            director_rnn: table.text(row, COL_LIST_DIRECTOR_RNN)?,
            court_decision_number: table.text(row, COL_COURT_NUMBER)?,
            court_decision_date,
        });
    }

    fail_on_row_errors(path, errors)?;
    Ok(records)
}

/// Import the business export into its relational table.
pub fn import_businesses(conn: &mut Connection, path: &Path) -> Result<usize> {
    let records = decode_businesses(path)?;
    db::insert_businesses(conn, &records)
}

/// Import the wrong-address list into both destinations.
pub async fn import_wrong_address(
    conn: &mut Connection,
    docs: &Database,
    path: &Path,
) -> Result<usize> {
    let records = decode_wrong_address(path)?;

    let batch: Vec<Document> = records.iter().map(|r| r.to_document()).collect();
    documents::insert_documents(docs, BusinessWrongAddress::TABLE, batch).await?;
    db::insert_wrong_address(conn, &records)?;

    Ok(records.len())
}

/// Import the bankrupt list into both destinations.
pub async fn import_bankrupt(conn: &mut Connection, docs: &Database, path: &Path) -> Result<usize> {
    let records = decode_bankrupt(path)?;

    let batch: Vec<Document> = records.iter().map(|r| r.to_document()).collect();
    documents::insert_documents(docs, BusinessBankrupt::TABLE, batch).await?;
    db::insert_bankrupt(conn, &records)?;

    Ok(records.len())
}

/// Import the invalid-registration list into both destinations.
pub async fn import_invalid_registration(
    conn: &mut Connection,
    docs: &Database,
    path: &Path,
) -> Result<usize> {
    let records = decode_invalid_registration(path)?;

    let batch: Vec<Document> = records.iter().map(|r| r.to_document()).collect();
    documents::insert_documents(docs, BusinessInvalidRegistration::TABLE, batch).await?;
    db::insert_invalid_registration(conn, &records)?;

    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use umya_spreadsheet::Spreadsheet;

    fn write_workbook<F>(dir: &Path, name: &str, build: F) -> PathBuf
    where
        F: FnOnce(&mut Spreadsheet),
    {
        let mut book = umya_spreadsheet::new_file();
        build(&mut book);
        let path = dir.join(name);
        umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write workbook");
        path
    }

    fn set_row(book: &mut Spreadsheet, row: u32, values: &[&str]) {
        let sheet = book.get_sheet_mut(&0).unwrap();
        for (i, value) in values.iter().enumerate() {
            sheet
                .get_cell_mut((i as u32 + 1, row))
                .set_value_string(value.to_string());
        }
    }

    const LIST_HEADERS: &[&str] = &[
        COL_LIST_BIN,
        COL_LIST_RNN,
        COL_LIST_FULL_NAME,
        COL_LIST_TAXPAYER_NAME,
        COL_LIST_DIRECTOR_NAME,
        COL_LIST_DIRECTOR_IIN,
        COL_LIST_DIRECTOR_RNN,
        COL_COURT_NUMBER,
        COL_COURT_DATE,
    ];

    fn bankrupt_fixture(dir: &Path) -> PathBuf {
        write_workbook(dir, BANKRUPT_FILE, |book| {
            set_row(book, 3, LIST_HEADERS);
            set_row(
                book,
                4,
                &[
                    "050840001234",
                    "600400112233",
                    "ТОО Ромашка",
                    "",
                    "Иванов И.И.",
                    "800101300123",
                    "",
                    "2-1234/2021",
                    "2021-03-15 00:00:00",
                ],
            );
            // Blank BIN: the row is excluded from every destination
            set_row(
                book,
                5,
                &["", "", "мусорная строка", "", "", "", "", "", ""],
            );
            set_row(
                book,
                6,
                &[
                    "050840005678",
                    "",
                    "ИП Сидоров",
                    "Сидоров С.С.",
                    "Сидоров С.С.",
                    "",
                    "",
                    "2-9999/2020",
                    "",
                ],
            );
        })
    }

    #[test]
    fn test_decode_bankrupt_skips_blank_bin() {
        let tmp = tempfile::tempdir().unwrap();
        let path = bankrupt_fixture(tmp.path());

        let records = decode_bankrupt(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].bin, "050840001234");
        assert_eq!(
            records[0].court_decision_date,
            chrono::NaiveDate::from_ymd_opt(2021, 3, 15)
        );
        assert_eq!(records[1].bin, "050840005678");
        assert_eq!(records[1].court_decision_date, None);
        // fillna(""): blank cells come through as empty strings
        assert_eq!(records[1].rnn, "");
    }

    #[test]
    fn test_decode_bankrupt_collects_bad_dates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_workbook(tmp.path(), BANKRUPT_FILE, |book| {
            set_row(book, 3, LIST_HEADERS);
            set_row(
                book,
                4,
                &["050840001234", "", "ТОО А", "", "", "", "", "1", "not-a-date"],
            );
            set_row(
                book,
                5,
                &["050840005678", "", "ТОО Б", "", "", "", "", "2", "also bad"],
            );
        });

        let err = decode_bankrupt(&path).unwrap_err().to_string();

        // Both bad rows are reported, not just the first
        assert!(err.contains("2 row(s)"), "unexpected error: {}", err);
        assert!(err.contains("row 4"));
        assert!(err.contains("row 5"));
        assert!(err.contains("not-a-date"));
    }

    #[test]
    fn test_decode_wrong_address_columns() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_workbook(tmp.path(), WRONG_ADDRESS_FILE, |book| {
            set_row(
                book,
                3,
                &[
                    COL_LIST_BIN,
                    COL_LIST_RNN,
                    COL_LIST_FULL_NAME,
                    COL_LIST_TAXPAYER_NAME,
                    COL_LIST_DIRECTOR_NAME,
                    COL_LIST_DIRECTOR_IIN,
                    COL_LIST_DIRECTOR_RNN,
                    COL_INSPECTION_NUMBER,
                    COL_INSPECTION_DATE,
                ],
            );
            set_row(
                book,
                4,
                &[
                    "050840001234",
                    "600400112233",
                    "ТОО Ромашка",
                    "",
                    "Иванов И.И.",
                    "800101300123",
                    "600400445566",
                    "214",
                    "2022-11-01 00:00:00",
                ],
            );
        });

        let records = decode_wrong_address(&path).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].inspection_act_number, "214");
        assert_eq!(
            records[0].inspection_act_date,
            chrono::NaiveDate::from_ymd_opt(2022, 11, 1)
        );
        assert_eq!(records[0].director_iin, "800101300123");
    }

    #[test]
    fn test_decode_businesses() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_workbook(tmp.path(), "request-export.xlsx", |book| {
            set_row(
                book,
                2,
                &[
                    "БИН",
                    "Полное наименование ",
                    "Дата регистрации",
                    "ОКЭД",
                    "Втор.ОКЭД",
                    "КРП",
                    "КАТО",
                ],
            );
            // BIN rendered as a float, date as an Excel serial (43647 = 2019-07-01)
            set_row(
                book,
                3,
                &[
                    "50840001234.0",
                    "ТОО Ромашка",
                    "43647",
                    "62010",
                    "",
                    "105",
                    "750000000",
                ],
            );
            set_row(
                book,
                4,
                &[
                    "50840005678",
                    "ИП Сидоров",
                    "2020-01-20 00:00:00",
                    "47110",
                    "47190",
                    "107",
                    "750000000",
                ],
            );
            // Blank BIN row (totals row in real exports)
            set_row(book, 5, &["", "Итого", "", "", "", "", ""]);
        });

        let records = decode_businesses(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].bin, "50840001234");
        assert_eq!(
            records[0].registration_date,
            chrono::NaiveDate::from_ymd_opt(2019, 7, 1).unwrap()
        );
        assert_eq!(records[0].additional_oked, "");
        assert_eq!(records[1].bin, "50840005678");
        assert_eq!(records[1].additional_oked, "47190");
    }

    #[test]
    fn test_import_businesses_into_relational_store() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_workbook(tmp.path(), "request-export.xlsx", |book| {
            set_row(
                book,
                2,
                &[
                    "БИН",
                    "Полное наименование ",
                    "Дата регистрации",
                    "ОКЭД",
                    "Втор.ОКЭД",
                    "КРП",
                    "КАТО",
                ],
            );
            set_row(
                book,
                3,
                &[
                    "50840001234",
                    "ТОО Ромашка",
                    "2019-07-01 00:00:00",
                    "62010",
                    "",
                    "105",
                    "750000000",
                ],
            );
            set_row(book, 4, &["", "", "", "", "", "", ""]);
            set_row(
                book,
                5,
                &[
                    "50840005678",
                    "ИП Сидоров",
                    "2020-01-20 00:00:00",
                    "47110",
                    "",
                    "107",
                    "750000000",
                ],
            );
        });

        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();

        let imported = import_businesses(&mut conn, &path).unwrap();

        assert_eq!(imported, 2);
        assert_eq!(db::count_rows(&conn, Business::TABLE).unwrap(), 2);

        // Re-running the import hits the primary key and aborts the batch
        let rerun = import_businesses(&mut conn, &path);
        assert!(rerun.is_err());
        assert_eq!(db::count_rows(&conn, Business::TABLE).unwrap(), 2);
    }

    #[test]
    fn test_document_batch_matches_decoded_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = bankrupt_fixture(tmp.path());

        let records = decode_bankrupt(&path).unwrap();
        let batch: Vec<Document> = records.iter().map(|r| r.to_document()).collect();

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch[0].get_str("bin").unwrap(),
            "050840001234"
        );
    }
}
