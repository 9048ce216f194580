use anyhow::{anyhow, Result};
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

use bin_registry::{
    count_rows, decode_businesses, documents, import_bankrupt, import_invalid_registration,
    import_wrong_address, insert_businesses, setup_database, Business, Config, BANKRUPT_FILE,
    INVALID_REGISTRATION_FILE, WRONG_ADDRESS_FILE,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("business") => {
            let path = args.get(2).map(PathBuf::from).ok_or_else(|| {
                anyhow!("usage: bin-registry business <workbook.xlsx>")
            })?;
            run_business_import(&path)
        }
        Some("lists") => run_lists_import().await,
        _ => {
            eprintln!("Usage:");
            eprintln!("  bin-registry business <workbook.xlsx>   import the business export");
            eprintln!("  bin-registry lists                      import the three taxpayer lists");
            std::process::exit(2);
        }
    }
}

fn run_business_import(path: &Path) -> Result<()> {
    println!("🗄️  Business Import - XLSX → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::from_env();

    // 1. Setup database
    println!("\n🔧 Setting up database...");
    let mut conn = Connection::open(&config.database_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized: {:?}", config.database_path);

    // 2. Decode workbook
    println!("\n📂 Loading workbook...");
    let records = decode_businesses(path)?;
    println!("✓ Decoded {} businesses from {:?}", records.len(), path);

    // 3. Insert batch
    println!("\n💾 Inserting businesses...");
    let inserted = insert_businesses(&mut conn, &records)?;
    println!("✓ Inserted: {} businesses", inserted);

    // 4. Verify count
    println!("\n🔍 Verifying database...");
    let count = count_rows(&conn, Business::TABLE)?;
    println!("✓ Table {} contains {} rows", Business::TABLE, count);

    Ok(())
}

async fn run_lists_import() -> Result<()> {
    println!("🗄️  Taxpayer Lists Import - XLSX → MongoDB + SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::from_env();

    println!("\n🔧 Setting up database...");
    let mut conn = Connection::open(&config.database_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized: {:?}", config.database_path);

    let docs = documents::connect(&config).await?;
    println!("✓ Document store: {}", config.mongo_database);

    println!("\n💾 Populating wrong address data");
    let path = config.data_dir.join(WRONG_ADDRESS_FILE);
    let count = import_wrong_address(&mut conn, &docs, &path).await?;
    println!("✓ Imported {} records", count);

    println!("\n💾 Populating bankrupt data");
    let path = config.data_dir.join(BANKRUPT_FILE);
    let count = import_bankrupt(&mut conn, &docs, &path).await?;
    println!("✓ Imported {} records", count);

    println!("\n💾 Populating invalid registration data");
    let path = config.data_dir.join(INVALID_REGISTRATION_FILE);
    let count = import_invalid_registration(&mut conn, &docs, &path).await?;
    println!("✓ Imported {} records", count);

    Ok(())
}
