//! loanbook command line
//!
//! Thin front end over the client store for field officers and support
//! staff: browse loans, inspect schedules, record repayments.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use loanbook::auth::session_expired;
use loanbook::config::Config;
use loanbook::loan::{
    today, CreateLoanRequest, LoanStatus, PaymentFrequency, PaymentMethod, RepaymentStatus,
};
use loanbook::state::{AppState, LoanListState};
use loanbook::telemetry;
use loanbook::view::{
    LoanDetailView, LoanListView, PaymentForm, PaymentHistoryView, SubmitOutcome,
};

#[derive(Parser)]
#[command(name = "loanbook", version, about = "Loan-servicing client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a session token
    Login { token: String },
    /// Forget the stored session token
    Logout,
    /// List loans
    Loans {
        #[arg(long)]
        status: Option<LoanStatus>,
        #[arg(long)]
        frequency: Option<PaymentFrequency>,
        #[arg(long)]
        customer: Option<String>,
        /// Keep fetching until the last page
        #[arg(long)]
        all: bool,
    },
    /// Show one loan with its repayment schedule
    Loan { id: String },
    /// Payment history of a loan
    History {
        id: String,
        #[arg(long)]
        status: Option<RepaymentStatus>,
    },
    /// Record a repayment against an installment
    Pay {
        loan_id: String,
        installment: u32,
        amount: String,
        #[arg(long, default_value = "cash")]
        method: PaymentMethod,
        #[arg(long)]
        notes: Option<String>,
        /// Payment date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Create a loan, or only preview its schedule
    Create {
        customer: String,
        principal: f64,
        #[arg(long, default_value_t = 10.0)]
        rate: f64,
        #[arg(long, default_value = "weekly")]
        frequency: PaymentFrequency,
        #[arg(long, default_value_t = 12)]
        installments: u32,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        preview: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    telemetry::init(&config);

    let reset_filters_on_error = config.reset_filters_on_error;
    let app = AppState::from_config(config).context("Failed to set up the API client")?;

    match &cli.command {
        Command::Login { token } => {
            app.tokens.set(token).await.context("Failed to store token")?;
            println!("Session token stored");
            return Ok(());
        }
        Command::Logout => {
            app.tokens.clear().await.context("Failed to clear token")?;
            println!("Session token cleared");
            return Ok(());
        }
        _ => {}
    }

    if let Some(token) = app.tokens.get().await.context("Failed to read token")? {
        if session_expired(&token, Utc::now()) {
            bail!("Session expired, run `loanbook login <token>` again");
        }
    }

    match cli.command {
        Command::Login { .. } | Command::Logout => {}
        Command::Loans {
            status,
            frequency,
            customer,
            all,
        } => {
            let mut view = match customer {
                Some(customer) => {
                    LoanListView::for_customer(app.store.clone(), customer, reset_filters_on_error)
                }
                None => LoanListView::new(app.store.clone(), reset_filters_on_error),
            };
            view.set_status_filter(status).await?;
            if frequency.is_some() {
                view.set_frequency_filter(frequency).await?;
            }
            if all {
                while app.store.fetch_next_page().await? {}
            }
            print_loans(&view.state().await);
        }
        Command::Loan { id } => {
            let mut view = LoanDetailView::new(app.store.clone(), id);
            view.open().await?;
            let day = today();
            let overview = view
                .overview(day)
                .await
                .context("Loan was not loaded")?;
            let loan = &overview.loan;
            println!(
                "Loan {}  customer {}  {}",
                loan.id,
                loan.customer_name.as_deref().unwrap_or(&loan.customer_id),
                loan.status
            );
            println!(
                "Principal {:.2}  total {:.2}  outstanding {:.2}  {} x {}",
                loan.principal_amount,
                loan.total_amount,
                overview.outstanding,
                loan.installments,
                loan.payment_frequency
            );
            println!(
                "Paid {}/{} installments, {} overdue, {:.0}% repaid",
                overview.schedule.paid_count,
                view.state().await.schedule.len(),
                overview.schedule.overdue_count,
                overview.schedule.progress() * 100.0
            );
            let history = PaymentHistoryView::new(app.store.clone());
            print_history(&history, day).await;
        }
        Command::History { id, status } => {
            let mut detail = LoanDetailView::new(app.store.clone(), id);
            detail.open().await?;
            let mut history = PaymentHistoryView::new(app.store.clone());
            history.set_status_filter(status);
            print_history(&history, today()).await;
        }
        Command::Pay {
            loan_id,
            installment,
            amount,
            method,
            notes,
            date,
        } => {
            let mut detail = LoanDetailView::new(app.store.clone(), loan_id.clone());
            detail.open().await?;
            let repayment = detail
                .installment(installment)
                .await
                .with_context(|| format!("Loan {} has no installment {}", loan_id, installment))?;

            let mut form = PaymentForm::new(app.store.clone(), repayment, today());
            form.set_amount(amount);
            form.set_method(method);
            if let Some(notes) = notes {
                form.set_notes(notes);
            }
            if let Some(date) = date {
                form.set_payment_date(date);
            }

            match form.submit().await {
                SubmitOutcome::NavigateBack(receipt) => {
                    println!(
                        "Recorded {:.2} against installment {} of loan {}",
                        receipt.submission.amount_paid,
                        receipt.submission.installment_number,
                        receipt.submission.loan_id
                    );
                    if !receipt.list_refreshed {
                        eprintln!("Loan list could not be refreshed");
                    }
                }
                SubmitOutcome::Stay { message } => bail!(message),
            }
        }
        Command::Create {
            customer,
            principal,
            rate,
            frequency,
            installments,
            start,
            notes,
            preview,
        } => {
            let request = CreateLoanRequest {
                customer_id: customer,
                principal_amount: principal,
                interest_rate: rate,
                payment_frequency: frequency,
                installments,
                start_date: start.unwrap_or_else(today),
                notes,
            };
            if preview {
                let preview = app.store.preview_loan(&request).await?;
                println!(
                    "Principal {:.2} + interest {:.2} = {:.2}, {} installments of {:.2}",
                    preview.principal_amount,
                    preview.interest_amount,
                    preview.total_amount,
                    preview.schedule.len(),
                    preview.installment_amount
                );
                for line in &preview.schedule {
                    println!(
                        "  #{:<3} {}  {:>10.2}",
                        line.installment_number, line.due_date, line.amount
                    );
                }
            } else {
                let loan = app.store.create_loan(request).await?;
                println!("Created loan {} ({:.2} total)", loan.id, loan.total_amount);
            }
        }
    }

    Ok(())
}

fn print_loans(list: &LoanListState) {
    for loan in &list.items {
        println!(
            "{:<12} {:<24} {:<10} {:<9} {:>12.2} {:>12.2}",
            loan.id,
            loan.customer_name.as_deref().unwrap_or(&loan.customer_id),
            loan.status.as_str(),
            loan.payment_frequency.as_str(),
            loan.total_amount,
            loan.outstanding_balance()
        );
    }
    println!(
        "Showing {} of {} loans (page {}/{}){}",
        list.items.len(),
        list.total,
        list.page,
        list.total_pages,
        if list.has_more { ", more available" } else { "" }
    );
}

async fn print_history(history: &PaymentHistoryView, day: NaiveDate) {
    for row in history.rows(day).await {
        let r = &row.repayment;
        println!(
            "#{:<3} due {}  {:<8} {:>10.2} paid {:>10.2} left {:>10.2}{}",
            r.installment_number,
            r.due_date,
            row.effective_status.as_str(),
            r.total_amount,
            r.amount_paid,
            row.remaining,
            r.notes
                .as_deref()
                .map(|n| format!("  {}", n))
                .unwrap_or_default()
        );
    }
}
