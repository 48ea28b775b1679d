use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Month, OffsetDateTime};

use centsible::{
    CategoryKind, CategoryName, Color, Email, NewBudget, NewCategory, NewTransaction,
    PasswordHash, ValidatedPassword, create_budget, create_category, create_transaction,
    create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of centsible.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const INCOME_CATEGORIES: [(&str, &str); 4] = [
    ("Salary", "#10b981"),
    ("Freelance", "#059669"),
    ("Investment", "#047857"),
    ("Other Income", "#065f46"),
];

const EXPENSE_CATEGORIES: [(&str, &str); 10] = [
    ("Food & Dining", "#ef4444"),
    ("Transportation", "#dc2626"),
    ("Shopping", "#b91c1c"),
    ("Entertainment", "#991b1b"),
    ("Bills & Utilities", "#7f1d1d"),
    ("Healthcare", "#f97316"),
    ("Education", "#ea580c"),
    ("Travel", "#c2410c"),
    ("Groceries", "#9a3412"),
    ("Rent", "#7c2d12"),
];

/// (description, base amount, category) triples for the income side.
const INCOME_TRANSACTIONS: [(&str, i64, &str); 4] = [
    ("Monthly Salary", 4500, "Salary"),
    ("Freelance Project", 800, "Freelance"),
    ("Stock Dividend", 150, "Investment"),
    ("Side Hustle", 300, "Other Income"),
];

/// (description, base amount, category) triples for the expense side.
const EXPENSE_TRANSACTIONS: [(&str, i64, &str); 15] = [
    ("Grocery Shopping", 120, "Groceries"),
    ("Restaurant Dinner", 45, "Food & Dining"),
    ("Gas Station", 60, "Transportation"),
    ("Netflix Subscription", 15, "Entertainment"),
    ("Electric Bill", 85, "Bills & Utilities"),
    ("Rent Payment", 1200, "Rent"),
    ("Online Shopping", 75, "Shopping"),
    ("Doctor Visit", 150, "Healthcare"),
    ("Coffee Shop", 12, "Food & Dining"),
    ("Movie Tickets", 25, "Entertainment"),
    ("Uber Ride", 18, "Transportation"),
    ("Phone Bill", 55, "Bills & Utilities"),
    ("Gym Membership", 40, "Healthcare"),
    ("Book Purchase", 30, "Education"),
    ("Weekend Trip", 200, "Travel"),
];

/// Budgets created for the current month.
const BUDGETS: [(&str, i64); 8] = [
    ("Food & Dining", 300),
    ("Transportation", 200),
    ("Shopping", 150),
    ("Entertainment", 100),
    ("Bills & Utilities", 250),
    ("Healthcare", 100),
    ("Groceries", 400),
    ("Travel", 200),
];

/// Create and populate a database for manual testing.
///
/// The data is deterministic so the same command always produces the same
/// database.
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

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("testpass123"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Email::new("test@example.com")?, password_hash, &conn)?;

    println!("Creating categories...");
    let mut category_ids = Vec::new();

    for (name, color) in INCOME_CATEGORIES {
        let category = create_category(
            NewCategory {
                name: CategoryName::new(name)?,
                kind: CategoryKind::Income,
                color: Color::new(color)?,
                user_id: user.id,
            },
            &conn,
        )?;
        category_ids.push((name, category.id));
    }

    for (name, color) in EXPENSE_CATEGORIES {
        let category = create_category(
            NewCategory {
                name: CategoryName::new(name)?,
                kind: CategoryKind::Expense,
                color: Color::new(color)?,
                user_id: user.id,
            },
            &conn,
        )?;
        category_ids.push((name, category.id));
    }

    let category_id = |name: &str| {
        category_ids
            .iter()
            .find(|(category_name, _)| *category_name == name)
            .map(|(_, id)| *id)
            .expect("sample data references a missing category")
    };

    println!("Creating transactions for the last 12 months...");
    let today = OffsetDateTime::now_utc().date();
    let mut transaction_count = 0;

    for (month_index, month_start) in trailing_months(today, 12).into_iter().enumerate() {
        // One or two income transactions a month.
        for pick in 0..=(month_index % 2) {
            let (description, base_amount, category) =
                INCOME_TRANSACTIONS[(month_index + pick * 3) % INCOME_TRANSACTIONS.len()];

            let date = day_in_month(month_start, month_index * 5 + pick * 11);
            if date > today {
                continue;
            }

            create_transaction(
                NewTransaction {
                    amount: Decimal::from(base_amount + ((month_index * 37 + pick * 53) % 200) as i64),
                    description: format!("{description} - {month_start}"),
                    kind: None,
                    date,
                    category_id: category_id(category),
                },
                user.id,
                &conn,
            )?;
            transaction_count += 1;
        }

        // Eight to fifteen expense transactions a month.
        let expense_count = 8 + (month_index * 3) % 8;
        for pick in 0..expense_count {
            let (description, base_amount, category) =
                EXPENSE_TRANSACTIONS[(month_index + pick * 7) % EXPENSE_TRANSACTIONS.len()];

            let date = day_in_month(month_start, month_index + pick * 3);
            if date > today {
                continue;
            }

            create_transaction(
                NewTransaction {
                    amount: Decimal::from(base_amount + ((month_index * 13 + pick * 29) % 50) as i64),
                    description: description.to_owned(),
                    kind: None,
                    date,
                    category_id: category_id(category),
                },
                user.id,
                &conn,
            )?;
            transaction_count += 1;
        }
    }

    println!("Created {transaction_count} transactions.");

    println!("Creating budgets for the current month...");
    let current_month = today.replace_day(1).unwrap();

    for (category, amount) in BUDGETS {
        create_budget(
            NewBudget {
                amount: Decimal::from(amount),
                month: current_month,
                category_id: category_id(category),
            },
            user.id,
            &conn,
        )?;
    }

    println!(
        "Success!\nTest credentials:\nEmail: test@example.com\nPassword: testpass123"
    );

    Ok(())
}

/// The first days of the `count` months ending with the month containing
/// `today`, oldest first.
fn trailing_months(today: Date, count: usize) -> Vec<Date> {
    let mut month_start = today.replace_day(1).unwrap();
    let mut months = vec![month_start];

    for _ in 1..count {
        month_start = previous_month(month_start);
        months.push(month_start);
    }

    months.reverse();
    months
}

/// The first day of the month before the one containing `date`.
fn previous_month(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::January => (date.year() - 1, Month::December),
        month => (date.year(), month.previous()),
    };

    Date::from_calendar_date(year, month, 1).unwrap()
}

/// A day in the month of `month_start` picked from `seed`, never past day 28.
fn day_in_month(month_start: Date, seed: usize) -> Date {
    month_start.replace_day(1 + (seed % 28) as u8).unwrap()
}
