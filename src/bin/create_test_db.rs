use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use expenser_rs::{PasswordHash, ValidatedPassword, initialize_db};

/// A utility for creating a test database for the REST API server of expenser_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const TEST_CATEGORIES: [(&str, &str, &str); 4] = [
    ("Groceries", "Expense", "Food and household supplies"),
    ("Rent", "Expense", "Weekly rent"),
    ("Salary", "Income", "Pay from work"),
    ("Index Fund", "Investment", "Monthly contributions"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user 'test' with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    conn.execute(
        "INSERT INTO user (name, username, password, created_at) VALUES (?1, ?2, ?3, ?4)",
        (
            "Test User",
            "test",
            password_hash.to_string(),
            OffsetDateTime::now_utc(),
        ),
    )?;
    let user_id = conn.last_insert_rowid();

    println!("Creating test categories...");

    for (name, category_type, description) in TEST_CATEGORIES {
        conn.execute(
            "INSERT INTO category (name, type, description, user_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                name,
                category_type,
                description,
                user_id,
                OffsetDateTime::now_utc(),
            ),
        )?;
    }

    println!("Success!");

    Ok(())
}
