use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gigbooks_core::types::{LineItem, UserProfile};
use gigbooks_core::{age_invoice, format_usd, today_in_tz};
use gigbooks_ledger::{Ledger, answer_prompt, import_expenses, parse_expense_csv};

mod auth;
mod chat;
mod llm;
mod state;

#[derive(Parser, Debug)]
#[command(name = "gigbooks", version, about = "Freelancer books: invoices, expenses, and an assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account on this machine and log in
    Register {
        #[arg(long)]
        fullname: String,

        #[arg(long)]
        email: String,

        /// Business name shown on invoices and in replies
        #[arg(long)]
        business: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "")]
        address: String,

        #[arg(long)]
        password: String,

        /// IANA timezone the business day ends in
        #[arg(long, default_value = "America/Chicago")]
        timezone: String,
    },

    /// Log in as an existing account
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Invoice commands
    Invoice {
        #[command(subcommand)]
        command: InvoiceCommand,
    },

    /// Expense commands
    Expense {
        #[command(subcommand)]
        command: ExpenseCommand,
    },

    /// View or edit the logged-in profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// One-screen dashboard: counts, outstanding, and what needs attention
    Summary,

    /// Ask the assistant one question and print the answer
    Ask {
        /// The question, e.g. "am I overdue on anything?"
        prompt: Vec<String>,
    },

    /// Interactive chat with the assistant (TTY required)
    Chat,

    /// Store model credentials for the assistant fallback
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum InvoiceCommand {
    /// Add an invoice (always starts out pending)
    Add {
        #[arg(long)]
        number: String,

        #[arg(long)]
        client: String,

        #[arg(long, default_value = "")]
        client_email: String,

        #[arg(long, default_value = "")]
        client_address: String,

        /// Line item as name=price; repeat for multiple items
        #[arg(long = "item", required = true)]
        items: Vec<String>,

        #[arg(long, default_value_t = 0.0)]
        tax: f64,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: NaiveDate,

        #[arg(long, default_value = "")]
        note: String,
    },

    /// List invoices with derived status
    List,

    /// Mark an invoice paid (one-way)
    MarkPaid {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    /// Record one expense
    Add {
        #[arg(long)]
        amount: f64,

        #[arg(long)]
        description: String,

        #[arg(long, default_value = "")]
        category: String,

        /// Date, YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List expenses
    List,

    /// Import expenses from a statement CSV (Date,Description,Amount,Category)
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Print the stored profile
    Show,

    /// Change profile fields; only the flags you pass are updated
    Edit {
        #[arg(long)]
        fullname: Option<String>,

        #[arg(long)]
        business: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste an Anthropic token (sk-ant-...)
    PasteAnthropicToken,

    /// Paste an OpenAI API key (sk-...)
    PasteOpenaiApiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Register {
            fullname,
            email,
            business,
            phone,
            address,
            password,
            timezone,
        } => {
            // Validate the timezone up front so a typo fails here, not on
            // the first `ask`.
            today_in_tz(&timezone)?;

            let mut ledger = Ledger::open(state::ledger_path()?)?;
            let user = ledger.register_user(UserProfile {
                id: String::new(),
                fullname,
                email,
                business,
                contact_phone: phone,
                contact_address: address,
                password,
            })?;
            ledger.save()?;
            state::write_session(&state::Session { user_id: user.id.clone(), timezone })?;
            println!("Registered {} ({}) and logged in.", user.fullname, user.email);
        }

        Command::Login { email, password } => {
            let ledger = Ledger::open(state::ledger_path()?)?;
            let Some(user) = ledger.login(&email, &password) else {
                bail!("no account matches that email and password");
            };
            let timezone = state::read_session()
                .map(|s| s.timezone)
                .unwrap_or_else(|_| "America/Chicago".to_string());
            state::write_session(&state::Session { user_id: user.id.clone(), timezone })?;
            println!("Logged in as {}.", user.fullname);
        }

        Command::Invoice { command } => match command {
            InvoiceCommand::Add {
                number,
                client,
                client_email,
                client_address,
                items,
                tax,
                due,
                note,
            } => {
                let session = state::read_session()?;
                let today = today_in_tz(&session.timezone)?;
                let items = items
                    .iter()
                    .map(|s| parse_line_item(s))
                    .collect::<Result<Vec<_>>>()?;

                let mut ledger = Ledger::open(state::ledger_path()?)?;
                let inv = ledger.add_invoice(
                    &session.user_id,
                    &number,
                    &client,
                    &client_email,
                    &client_address,
                    items,
                    tax,
                    &note,
                    due,
                    today,
                )?;
                ledger.save()?;
                println!(
                    "Added invoice {} for {} — {} due {}",
                    inv.id,
                    inv.client_name,
                    format_usd(inv.total()),
                    inv.due_date
                );
            }

            InvoiceCommand::List => {
                let session = state::read_session()?;
                let today = today_in_tz(&session.timezone)?;
                let ledger = Ledger::open(state::ledger_path()?)?;
                let invoices = ledger.invoices_for(&session.user_id);
                if invoices.is_empty() {
                    println!("No invoices yet. Add one: gigbooks invoice add");
                    return Ok(());
                }
                for inv in invoices {
                    let aging = age_invoice(inv, today);
                    let status = if inv.is_paid() {
                        "paid".to_string()
                    } else if aging.is_overdue {
                        format!("overdue {}d", aging.days_overdue)
                    } else {
                        format!("pending, due in {}d", aging.days_till_due)
                    };
                    println!(
                        "{} | {} | {} | {} | due {} | {}",
                        inv.id,
                        inv.invoice_number,
                        aging.client_name,
                        format_usd(inv.total()),
                        inv.due_date,
                        status
                    );
                }
            }

            InvoiceCommand::MarkPaid { id } => {
                let session = state::read_session()?;
                let mut ledger = Ledger::open(state::ledger_path()?)?;
                ledger.mark_invoice_paid(&session.user_id, &id)?;
                ledger.save()?;
                println!("Marked {id} paid.");
            }
        },

        Command::Expense { command } => match command {
            ExpenseCommand::Add {
                amount,
                description,
                category,
                date,
            } => {
                let session = state::read_session()?;
                let today = today_in_tz(&session.timezone)?;
                let mut ledger = Ledger::open(state::ledger_path()?)?;
                let exp = ledger.add_expense(
                    &session.user_id,
                    amount,
                    &description,
                    &category,
                    date.unwrap_or(today),
                );
                ledger.save()?;
                println!(
                    "Added expense {} — {} ({}) on {}",
                    exp.id,
                    format_usd(exp.amount),
                    exp.category,
                    exp.date
                );
            }

            ExpenseCommand::List => {
                let session = state::read_session()?;
                let ledger = Ledger::open(state::ledger_path()?)?;
                let expenses = ledger.expenses_for(&session.user_id);
                if expenses.is_empty() {
                    println!("No expenses yet. Add one: gigbooks expense add");
                    return Ok(());
                }
                for e in expenses {
                    println!(
                        "{} | {} | {} | {} | {}",
                        e.id,
                        e.date,
                        format_usd(e.amount),
                        e.category,
                        e.description
                    );
                }
            }

            ExpenseCommand::Import { csv } => {
                if !csv.exists() {
                    bail!("CSV not found: {} (pass --csv <path>)", csv.display());
                }
                let session = state::read_session()?;
                let rows = parse_expense_csv(&csv)
                    .with_context(|| format!("parsing {}", csv.display()))?;
                let mut ledger = Ledger::open(state::ledger_path()?)?;
                let n = import_expenses(&mut ledger, &session.user_id, &rows);
                ledger.save()?;
                println!("Imported {} expenses from {}", n, csv.display());
            }
        },

        Command::Profile { command } => match command {
            ProfileCommand::Show => {
                let session = state::read_session()?;
                let ledger = Ledger::open(state::ledger_path()?)?;
                let user = ledger
                    .user(&session.user_id)
                    .context("session user not found; run: gigbooks login")?;
                println!("{}", gigbooks_core::reply::profile_info(user));
            }

            ProfileCommand::Edit { fullname, business, phone, address } => {
                if fullname.is_none() && business.is_none() && phone.is_none() && address.is_none()
                {
                    bail!(
                        "nothing to change (pass --fullname, --business, --phone, or --address)"
                    );
                }
                let session = state::read_session()?;
                let mut ledger = Ledger::open(state::ledger_path()?)?;
                let mut user = ledger
                    .user(&session.user_id)
                    .context("session user not found; run: gigbooks login")?
                    .clone();
                if let Some(v) = fullname {
                    user.fullname = v;
                }
                if let Some(v) = business {
                    user.business = v;
                }
                if let Some(v) = phone {
                    user.contact_phone = v;
                }
                if let Some(v) = address {
                    user.contact_address = v;
                }
                ledger.update_profile(user)?;
                ledger.save()?;
                println!("Profile updated.");
            }
        },

        Command::Summary => {
            let session = state::read_session()?;
            let today = today_in_tz(&session.timezone)?;
            let ledger = Ledger::open(state::ledger_path()?)?;
            print_summary(&ledger, &session.user_id, today)?;
        }

        Command::Ask { prompt } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                bail!("nothing to ask (try: gigbooks ask \"am I overdue on anything?\")");
            }
            let session = state::read_session()?;
            let today = today_in_tz(&session.timezone)?;
            let mut ledger = Ledger::open(state::ledger_path()?)?;
            let user = ledger
                .user(&session.user_id)
                .context("session user not found; run: gigbooks login")?
                .clone();

            let answer = match answer_prompt(&ledger, &user.id, &prompt, today)? {
                Some(a) => a,
                None => ask_fallback(&user, &prompt)?,
            };
            println!("{answer}");

            ledger.add_conversation(
                &user.id,
                &prompt,
                &answer,
                &chrono::Utc::now().to_rfc3339(),
            );
            if let Err(e) = ledger.save() {
                eprintln!("warning: could not save conversation: {e}");
            }
        }

        Command::Chat => {
            let session = state::read_session()?;
            let today = today_in_tz(&session.timezone)?;
            let mut ledger = Ledger::open(state::ledger_path()?)?;
            let user = ledger
                .user(&session.user_id)
                .context("session user not found; run: gigbooks login")?
                .clone();
            chat::run_chat(&mut ledger, &user, today)?;
        }

        Command::Auth { command } => match command {
            AuthCommand::PasteAnthropicToken => auth::store_anthropic_token()?,
            AuthCommand::PasteOpenaiApiKey => auth::store_openai_key()?,
        },
    }

    Ok(())
}

/// "Logo design=450.00" -> LineItem. Splits on the last '=' so item
/// names may contain one.
fn parse_line_item(s: &str) -> Result<LineItem> {
    let (name, price) = s
        .rsplit_once('=')
        .with_context(|| format!("bad line item {s:?} (expected name=price)"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("bad line item {s:?}: empty name");
    }
    let price: f64 = price
        .trim()
        .parse()
        .with_context(|| format!("bad price in line item {s:?}"))?;
    if price < 0.0 {
        bail!("bad line item {s:?}: negative price");
    }
    Ok(LineItem { name: name.to_string(), price })
}

fn ask_fallback(user: &UserProfile, prompt: &str) -> Result<String> {
    let Some(model) = llm::Fallback::from_saved()? else {
        bail!(
            "no model configured for open-ended questions; run: gigbooks auth paste-anthropic-token (or paste-openai-api-key)"
        );
    };
    let system = llm::assistant_system_prompt(Some(user));
    model.complete(&system, &[llm::ChatTurn::user(prompt)])
}

fn print_summary(ledger: &Ledger, user_id: &str, today: NaiveDate) -> Result<()> {
    use gigbooks_ledger::stats;

    let user = ledger
        .user(user_id)
        .context("session user not found; run: gigbooks login")?;

    println!("# {} — {}\n", user.business, today);

    let s = stats::invoice_stats(ledger, user_id, today);
    println!("## Invoices\n");
    println!(
        "{} total: {} paid, {} pending, {} overdue\n",
        s.total, s.paid, s.pending, s.overdue
    );

    let ctx = stats::unpaid_context(ledger, user_id, today);
    println!("## Outstanding\n");
    println!("{} across {} unpaid invoices\n", format_usd(ctx.outstanding_total()), ctx.total_unpaid);

    let attention: Vec<_> = ctx
        .details
        .iter()
        .filter(|d| d.is_overdue || d.is_due_today() || d.is_at_risk())
        .collect();
    println!("## Needs attention\n");
    if attention.is_empty() {
        println!("Nothing due or overdue right now.\n");
    } else {
        for d in &attention {
            let when = if d.is_overdue {
                format!("{} days overdue", d.days_overdue)
            } else if d.is_due_today() {
                "due today".to_string()
            } else {
                format!("due in {} days", d.days_till_due)
            };
            println!("- {} — {} ({})", d.client_name, format_usd(d.total), when);
        }
        println!();
    }

    let ytd = stats::year_to_date(ledger, user_id, today);
    let e = stats::expense_stats(ledger, user_id);
    println!("## This year\n");
    println!(
        "Income {} from {} paid invoices; expenses {} across {} entries",
        format_usd(ytd.total_income),
        ytd.count,
        format_usd(e.total_amount),
        e.count
    );

    println!("\n## Next actions\n");
    println!("- Ask anything: `gigbooks ask \"what needs attention?\"`");
    println!("- Chat: `gigbooks chat`");
    println!("- Import a statement: `gigbooks expense import --csv <file>`");

    Ok(())
}
